//! Números de Syscall
//!
//! A tabela segue a ordem histórica do `sysnum.h` original; o índice é o
//! valor carregado em EAX pelo userspace antes do `int`.

pub const SYS_WRITE: u32 = 0;
pub const SYS_READ: u32 = 1;
pub const SYS_BRK: u32 = 2;
pub const SYS_SLEEP: u32 = 3;
pub const SYS_EXEC: u32 = 4;
pub const SYS_GETPID: u32 = 5;
pub const SYS_GETTID: u32 = 6;
pub const SYS_YIELD: u32 = 7;
pub const SYS_FORK: u32 = 8;
pub const SYS_EXIT: u32 = 9;
pub const SYS_EXIT_GROUP: u32 = 10;
pub const SYS_WAIT: u32 = 11;
pub const SYS_SEM_OPEN: u32 = 12;
pub const SYS_SEM_P: u32 = 13;
pub const SYS_SEM_V: u32 = 14;
pub const SYS_SEM_CLOSE: u32 = 15;
pub const SYS_OPEN: u32 = 16;
pub const SYS_CLOSE: u32 = 17;
pub const SYS_DUP: u32 = 18;
pub const SYS_LSEEK: u32 = 19;
pub const SYS_FSTAT: u32 = 20;
pub const SYS_CHDIR: u32 = 21;
pub const SYS_UNLINK: u32 = 22;
pub const SYS_MMAP: u32 = 23;
pub const SYS_MUNMAP: u32 = 24;
pub const SYS_CLONE: u32 = 25;
pub const SYS_JOIN: u32 = 26;
pub const SYS_DETACH: u32 = 27;
pub const SYS_KILL: u32 = 28;
pub const SYS_CV_OPEN: u32 = 29;
pub const SYS_CV_WAIT: u32 = 30;
pub const SYS_CV_SIG: u32 = 31;
pub const SYS_CV_SIGALL: u32 = 32;
pub const SYS_CV_CLOSE: u32 = 33;
pub const SYS_PIPE: u32 = 34;
pub const SYS_MKFIFO: u32 = 35;
pub const SYS_LINK: u32 = 36;
pub const SYS_SYMLINK: u32 = 37;
pub const SYS_SIGACTION: u32 = 38;
pub const SYS_SIGPROCMASK: u32 = 39;

/// Total de syscalls na tabela de dispatch.
pub const NR_SYS: u32 = 40;
