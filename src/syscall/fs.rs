//! Syscalls de arquivos, diretórios, pipes e FIFOs.

use alloc::vec;

use crate::file::file::{File, FileBack};
use crate::fs::layout::InodeType;
use crate::sched::pending::Completion;
use crate::sys::error::SysError;
use crate::sys::flags::{OpenFlags, SEEK_CUR, SEEK_END, SEEK_SET};
use crate::syscall::SysRet;
use crate::Kernel;

impl Kernel {
    pub(crate) fn sys_open(&mut self, path_va: u32, flags: u32) -> SysRet {
        let path = self.user_cstr(self.curr, path_va)?;
        let flags = OpenFlags::from_bits(flags).ok_or(SysError::InvalidArgument)?;
        let fd = self.file_open(&path, flags)?;
        Ok(Some(fd as isize))
    }

    pub(crate) fn sys_close(&mut self, fd: usize) -> SysRet {
        let fid = self.fd_lookup(fd)?;
        let leader = self.leader_of(self.curr);
        self.procs.get_mut(leader).files[fd] = None;
        self.file_close(fid);
        Ok(Some(0))
    }

    /// Novo fd apontando para o mesmo handle (offset compartilhado).
    pub(crate) fn sys_dup(&mut self, fd: usize) -> SysRet {
        let fid = self.fd_lookup(fd)?;
        let new_fd = self.fd_install(fid)?;
        self.files.dup(fid);
        Ok(Some(new_fd as isize))
    }

    pub(crate) fn sys_read(&mut self, fd: usize, buf_va: u32, len: usize) -> SysRet {
        let fid = self.fd_lookup(fd)?;
        let file = self.files.get(fid);
        if !file.flags.readable() {
            return Err(SysError::PermissionDenied);
        }
        match file.back {
            FileBack::Inode(idx) => {
                let off = file.off;
                let mut buf = vec![0u8; len];
                let n = self.fs.iread(&mut *self.disk, idx, off, &mut buf);
                self.user_write(self.curr, buf_va, &buf[..n])?;
                self.files.get_mut(fid).off += n as u32;
                Ok(Some(n as isize))
            }
            FileBack::Dev(dev) => {
                let mut buf = vec![0u8; len];
                let n = self.devs.get_mut(dev)?.read(&mut buf)?;
                self.user_write(self.curr, buf_va, &buf[..n])?;
                Ok(Some(n as isize))
            }
            FileBack::Pipe(pipe) => {
                match self.pipe_read_drive(self.curr, pipe, buf_va, len) {
                    Completion::Resume(val) => Ok(val),
                    _ => Ok(None),
                }
            }
        }
    }

    pub(crate) fn sys_write(&mut self, fd: usize, buf_va: u32, len: usize) -> SysRet {
        let fid = self.fd_lookup(fd)?;
        let file = self.files.get(fid);
        if !file.flags.writable() {
            return Err(SysError::PermissionDenied);
        }
        match file.back {
            FileBack::Inode(idx) => {
                let off = file.off;
                let mut buf = vec![0u8; len];
                self.user_read(self.curr, buf_va, &mut buf)?;
                let n = self.fs.iwrite(&mut *self.disk, idx, off, &buf)?;
                self.files.get_mut(fid).off += n as u32;
                Ok(Some(n as isize))
            }
            FileBack::Dev(dev) => {
                let mut buf = vec![0u8; len];
                self.user_read(self.curr, buf_va, &mut buf)?;
                let n = self.devs.get_mut(dev)?.write(&buf)?;
                Ok(Some(n as isize))
            }
            FileBack::Pipe(pipe) => {
                match self.pipe_write_drive(self.curr, pipe, buf_va, len, 0) {
                    Completion::Resume(val) => Ok(val),
                    _ => Ok(None),
                }
            }
        }
    }

    /// Move o offset do handle. Sem clamp: vale posicionar além do fim;
    /// a leitura lá devolve zero bytes e a escrita falha.
    pub(crate) fn sys_lseek(&mut self, fd: usize, off: i32, whence: u32) -> SysRet {
        let fid = self.fd_lookup(fd)?;
        let file = self.files.get(fid);
        let FileBack::Inode(idx) = file.back else {
            return Err(SysError::InvalidArgument);
        };
        let base = match whence {
            SEEK_SET => 0i64,
            SEEK_CUR => file.off as i64,
            SEEK_END => self.fs.get(idx).size as i64,
            _ => return Err(SysError::InvalidArgument),
        };
        let new = base + off as i64;
        if new < 0 || new > u32::MAX as i64 {
            return Err(SysError::InvalidArgument);
        }
        self.files.get_mut(fid).off = new as u32;
        Ok(Some(new as isize))
    }

    /// Preenche `{tipo, tamanho, inode}` (3 x u32). Handles de pipe e de
    /// dispositivo não têm inode para mostrar.
    pub(crate) fn sys_fstat(&mut self, fd: usize, stat_va: u32) -> SysRet {
        let fid = self.fd_lookup(fd)?;
        let FileBack::Inode(idx) = self.files.get(fid).back else {
            return Err(SysError::InvalidArgument);
        };
        let (ty, size, ino) = {
            let inode = self.fs.get(idx);
            (inode.ty as u32, inode.size, inode.ino)
        };
        let mut buf = [0u8; 12];
        buf[0..4].copy_from_slice(&ty.to_le_bytes());
        buf[4..8].copy_from_slice(&size.to_le_bytes());
        buf[8..12].copy_from_slice(&ino.to_le_bytes());
        self.user_write(self.curr, stat_va, &buf)?;
        Ok(Some(0))
    }

    pub(crate) fn sys_chdir(&mut self, path_va: u32) -> SysRet {
        let path = self.user_cstr(self.curr, path_va)?;
        let leader = self.leader_of(self.curr);
        let cwd = self.procs.get(leader).cwd.ok_or(SysError::BadHandle)?;
        let new = self.fs.iopen(&mut *self.disk, cwd, &path)?;
        if self.fs.get(new).ty != InodeType::Dir {
            self.fs.iclose(&mut *self.disk, new);
            return Err(SysError::NotFound);
        }
        self.fs.iclose(&mut *self.disk, cwd);
        self.procs.get_mut(leader).cwd = Some(new);
        Ok(Some(0))
    }

    /// Apaga a entrada de diretório; o inode some quando o último handle
    /// fechar. FIFOs perdem sua ligação com o pipe na hora.
    pub(crate) fn sys_unlink(&mut self, path_va: u32) -> SysRet {
        let path = self.user_cstr(self.curr, path_va)?;
        let leader = self.leader_of(self.curr);
        let cwd = self.procs.get(leader).cwd.ok_or(SysError::BadHandle)?;
        let (parent, name) = self.fs.iopen_parent(&mut *self.disk, cwd, &path)?;
        let removed = self.fs.iremove(&mut *self.disk, parent, name);
        self.fs.iclose(&mut *self.disk, parent);
        let (ino, ty) = removed?;
        if ty == InodeType::Fifo {
            self.pipes.rmfifo(ino);
        }
        Ok(Some(0))
    }

    pub(crate) fn sys_link(&mut self, old_va: u32, new_va: u32) -> SysRet {
        let old = self.user_cstr(self.curr, old_va)?;
        let new = self.user_cstr(self.curr, new_va)?;
        let leader = self.leader_of(self.curr);
        let cwd = self.procs.get(leader).cwd.ok_or(SysError::BadHandle)?;
        self.fs.ilink(&mut *self.disk, cwd, &old, &new)?;
        Ok(Some(0))
    }

    /// Cria um symlink cujo conteúdo é o caminho alvo, sem validar se o
    /// alvo existe.
    pub(crate) fn sys_symlink(&mut self, target_va: u32, link_va: u32) -> SysRet {
        let target = self.user_cstr(self.curr, target_va)?;
        let link = self.user_cstr(self.curr, link_va)?;
        let leader = self.leader_of(self.curr);
        let cwd = self.procs.get(leader).cwd.ok_or(SysError::BadHandle)?;
        let (parent, name) = self.fs.iopen_parent(&mut *self.disk, cwd, &link)?;
        let created = self
            .fs
            .icreate(&mut *self.disk, parent, name, InodeType::Symlink, 0);
        self.fs.iclose(&mut *self.disk, parent);
        let idx = created?;
        self.fs.iwrite(&mut *self.disk, idx, 0, target.as_bytes())?;
        self.fs.iclose(&mut *self.disk, idx);
        Ok(Some(0))
    }

    /// Cria o nó de FIFO; o pipe por trás só nasce na primeira abertura.
    pub(crate) fn sys_mkfifo(&mut self, path_va: u32) -> SysRet {
        let path = self.user_cstr(self.curr, path_va)?;
        let leader = self.leader_of(self.curr);
        let cwd = self.procs.get(leader).cwd.ok_or(SysError::BadHandle)?;
        let (parent, name) = self.fs.iopen_parent(&mut *self.disk, cwd, &path)?;
        let created = self
            .fs
            .icreate(&mut *self.disk, parent, name, InodeType::Fifo, 0);
        self.fs.iclose(&mut *self.disk, parent);
        let idx = created?;
        self.fs.iclose(&mut *self.disk, idx);
        Ok(Some(0))
    }

    /// Cria um pipe anônimo e escreve `[fd_leitura, fd_escrita]` em
    /// `fds_va`.
    pub(crate) fn sys_pipe(&mut self, fds_va: u32) -> SysRet {
        let pipe = self.pipes.alloc(&mut self.sems, None, true, true)?;

        let rfile = File {
            refs: 1,
            back: FileBack::Pipe(pipe),
            off: 0,
            flags: OpenFlags::empty(),
        };
        let wfile = File {
            refs: 1,
            back: FileBack::Pipe(pipe),
            off: 0,
            flags: OpenFlags::WRONLY,
        };

        let rfid = match self.files.alloc(rfile) {
            Ok(f) => f,
            Err(e) => {
                self.pipes.close_end(&mut self.sems, pipe, false);
                self.pipes.close_end(&mut self.sems, pipe, true);
                return Err(e);
            }
        };
        let rfd = match self.fd_install(rfid) {
            Ok(fd) => fd,
            Err(e) => {
                self.file_close(rfid);
                self.pipes.close_end(&mut self.sems, pipe, true);
                return Err(e);
            }
        };
        let wfid = match self.files.alloc(wfile) {
            Ok(f) => f,
            Err(e) => {
                self.sys_close(rfd).ok();
                self.pipes.close_end(&mut self.sems, pipe, true);
                return Err(e);
            }
        };
        let wfd = match self.fd_install(wfid) {
            Ok(fd) => fd,
            Err(e) => {
                self.file_close(wfid);
                self.sys_close(rfd).ok();
                return Err(e);
            }
        };

        let mut buf = [0u8; 8];
        buf[0..4].copy_from_slice(&(rfd as u32).to_le_bytes());
        buf[4..8].copy_from_slice(&(wfd as u32).to_le_bytes());
        if let Err(e) = self.user_write(self.curr, fds_va, &buf) {
            self.sys_close(wfd).ok();
            self.sys_close(rfd).ok();
            return Err(e);
        }
        Ok(Some(0))
    }
}
