//! Tabela de dispatch.

use crate::sys::context::Context;
use crate::sys::error::SysError;
use crate::sys::numbers::*;
use crate::syscall::SysRet;
use crate::Kernel;

impl Kernel {
    /// Decodifica e executa a syscall do contexto. `Some(v)` deve ir para
    /// o EAX vivo; `None` significa que o EAX já foi (ou será) tratado.
    pub(crate) fn do_syscall(&mut self, ctx: &mut Context) -> Option<isize> {
        let num = ctx.eax;
        let (a1, a2, a3, _a4, _a5) = ctx.syscall_args();
        crate::ktrace!("(SYS) chamada num=", num as u64);

        let ret: SysRet = match num {
            SYS_WRITE => self.sys_write(a1 as usize, a2, a3 as usize),
            SYS_READ => self.sys_read(a1 as usize, a2, a3 as usize),
            SYS_BRK => self.sys_brk(a1),
            SYS_SLEEP => self.sys_sleep(a1),
            SYS_EXEC => self.sys_exec(ctx, a1, a2),
            SYS_GETPID => self.sys_getpid(),
            SYS_GETTID => self.sys_gettid(),
            SYS_YIELD => self.sys_yield(),
            SYS_FORK => self.sys_fork(ctx),
            SYS_EXIT => self.sys_exit(a1 as i32),
            SYS_EXIT_GROUP => self.sys_exit_group(a1 as i32),
            SYS_WAIT => self.sys_wait(a1),
            SYS_SEM_OPEN => self.sys_sem_open(a1 as i32),
            SYS_SEM_P => self.sys_sem_p(a1 as usize),
            SYS_SEM_V => self.sys_sem_v(a1 as usize),
            SYS_SEM_CLOSE => self.sys_sem_close(a1 as usize),
            SYS_OPEN => self.sys_open(a1, a2),
            SYS_CLOSE => self.sys_close(a1 as usize),
            SYS_DUP => self.sys_dup(a1 as usize),
            SYS_LSEEK => self.sys_lseek(a1 as usize, a2 as i32, a3),
            SYS_FSTAT => self.sys_fstat(a1 as usize, a2),
            SYS_CHDIR => self.sys_chdir(a1),
            SYS_UNLINK => self.sys_unlink(a1),
            SYS_MMAP => self.sys_mmap(),
            SYS_MUNMAP => self.sys_munmap(a1),
            SYS_CLONE => self.sys_clone(a1, a2, a3),
            SYS_JOIN => self.sys_join(a1, a2),
            SYS_DETACH => self.sys_detach(a1),
            SYS_KILL => self.sys_kill(a1, a2),
            SYS_CV_OPEN => self.sys_cv_open(),
            SYS_CV_WAIT => self.sys_cv_wait(a1 as usize, a2 as usize),
            SYS_CV_SIG => self.sys_cv_sig(a1 as usize),
            SYS_CV_SIGALL => self.sys_cv_sigall(a1 as usize),
            SYS_CV_CLOSE => self.sys_sem_close(a1 as usize),
            SYS_PIPE => self.sys_pipe(a1),
            SYS_MKFIFO => self.sys_mkfifo(a1),
            SYS_LINK => self.sys_link(a1, a2),
            SYS_SYMLINK => self.sys_symlink(a1, a2),
            SYS_SIGACTION => self.sys_sigaction(a1, a2),
            SYS_SIGPROCMASK => self.sys_sigprocmask(a1, a2),
            _ => {
                crate::kwarn!("(SYS) numero desconhecido=", num as u64);
                Err(SysError::NotImplemented)
            }
        };

        match ret {
            Ok(Some(v)) => Some(v),
            Ok(None) => None,
            Err(e) => Some(e.as_isize()),
        }
    }
}
