//! Tabela global de arquivos abertos.
//!
//! Cada handle tem contagem de referências (`dup` e `fork` compartilham a
//! mesma entrada, inclusive o offset). O que o handle aponta depende do
//! tipo do inode na abertura: arquivos e diretórios seguram o inode,
//! dispositivos e FIFOs soltam o inode na hora e guardam só o número do
//! dispositivo ou o pipe.

use crate::fs::layout::InodeType;
use crate::ipc::pipe::EndState;
use crate::sched::config::TOTAL_FILE;
use crate::sys::error::{SysError, SysResult};
use crate::sys::flags::OpenFlags;
use crate::sys::types::{DevId, FileId, InodeIdx, PipeId};
use crate::Kernel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileBack {
    Inode(InodeIdx),
    Pipe(PipeId),
    Dev(DevId),
}

pub struct File {
    pub refs: u32,
    pub back: FileBack,
    pub off: u32,
    pub flags: OpenFlags,
}

pub struct FileTable {
    slots: [Option<File>; TOTAL_FILE],
}

impl FileTable {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    pub fn alloc(&mut self, file: File) -> SysResult<FileId> {
        let id = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(SysError::ResourceExhausted)?;
        self.slots[id] = Some(file);
        Ok(id)
    }

    pub fn get(&self, id: FileId) -> &File {
        match self.slots[id].as_ref() {
            Some(file) => file,
            None => panic!("handle de arquivo vazio"),
        }
    }

    pub fn get_mut(&mut self, id: FileId) -> &mut File {
        match self.slots[id].as_mut() {
            Some(file) => file,
            None => panic!("handle de arquivo vazio"),
        }
    }

    /// Mais uma referência ao handle.
    pub fn dup(&mut self, id: FileId) {
        self.get_mut(id).refs += 1;
    }

    /// Solta uma referência; com a última, devolve o handle para o
    /// chamador desmontar o que ele segurava.
    pub fn drop_ref(&mut self, id: FileId) -> Option<File> {
        let file = self.get_mut(id);
        debug_assert!(file.refs > 0);
        file.refs -= 1;
        if file.refs == 0 {
            self.slots[id].take()
        } else {
            None
        }
    }
}

impl Kernel {
    /// Traduz um fd do processo atual para o handle global.
    pub(crate) fn fd_lookup(&self, fd: usize) -> SysResult<FileId> {
        let leader = self.leader_of(self.curr);
        if fd >= self.procs.get(leader).files.len() {
            return Err(SysError::BadHandle);
        }
        self.procs.get(leader).files[fd].ok_or(SysError::BadHandle)
    }

    /// Instala um handle no menor fd livre do processo atual.
    pub(crate) fn fd_install(&mut self, fid: FileId) -> SysResult<usize> {
        let leader = self.leader_of(self.curr);
        let files = &mut self.procs.get_mut(leader).files;
        let fd = files
            .iter()
            .position(|f| f.is_none())
            .ok_or(SysError::ResourceExhausted)?;
        files[fd] = Some(fid);
        Ok(fd)
    }

    /// Abre (e se preciso cria) um caminho, devolvendo o fd.
    pub(crate) fn file_open(&mut self, path: &str, flags: OpenFlags) -> SysResult<usize> {
        let leader = self.leader_of(self.curr);
        let cwd = self.procs.get(leader).cwd.ok_or(SysError::BadHandle)?;

        let idx = match self.fs.iopen(&mut *self.disk, cwd, path) {
            Ok(idx) => idx,
            Err(SysError::NotFound) if flags.contains(OpenFlags::CREATE) => {
                let (parent, name) = self.fs.iopen_parent(&mut *self.disk, cwd, path)?;
                let ty = if flags.contains(OpenFlags::DIR) {
                    InodeType::Dir
                } else {
                    InodeType::File
                };
                let created = self.fs.icreate(&mut *self.disk, parent, name, ty, 0);
                self.fs.iclose(&mut *self.disk, parent);
                created?
            }
            Err(e) => return Err(e),
        };

        let ty = self.fs.get(idx).ty;
        if flags.contains(OpenFlags::DIR) && ty != InodeType::Dir {
            self.fs.iclose(&mut *self.disk, idx);
            return Err(SysError::InvalidArgument);
        }
        if ty == InodeType::Dir && flags.writable() {
            self.fs.iclose(&mut *self.disk, idx);
            return Err(SysError::PermissionDenied);
        }

        let back = match ty {
            InodeType::Dev => {
                let dev = self.fs.get(idx).device;
                self.fs.iclose(&mut *self.disk, idx);
                FileBack::Dev(dev)
            }
            InodeType::Fifo => {
                let ino = self.fs.get(idx).ino;
                self.fs.iclose(&mut *self.disk, idx);
                let pipe = match self.pipes.fifo_lookup(ino) {
                    Some(pipe) => {
                        // abre a(s) ponta(s) correspondente(s) no pipe já vivo
                        let p = self.pipes.get_mut(pipe);
                        if flags.readable() {
                            p.read_end = EndState::Open;
                        }
                        if flags.writable() {
                            p.write_end = EndState::Open;
                        }
                        pipe
                    }
                    None => self.pipes.alloc(
                        &mut self.sems,
                        Some(ino),
                        flags.readable(),
                        flags.writable(),
                    )?,
                };
                FileBack::Pipe(pipe)
            }
            _ => {
                if flags.contains(OpenFlags::TRUNC) && ty == InodeType::File {
                    self.fs.itrunc(&mut *self.disk, idx);
                }
                FileBack::Inode(idx)
            }
        };

        let fid = match self.files.alloc(File {
            refs: 1,
            back,
            off: 0,
            flags,
        }) {
            Ok(fid) => fid,
            Err(e) => {
                self.file_teardown(File {
                    refs: 0,
                    back,
                    off: 0,
                    flags,
                });
                return Err(e);
            }
        };
        match self.fd_install(fid) {
            Ok(fd) => Ok(fd),
            Err(e) => {
                self.file_close(fid);
                Err(e)
            }
        }
    }

    /// Solta uma referência do handle; a última desmonta o que ele
    /// segurava (inode, ponta de pipe).
    pub(crate) fn file_close(&mut self, fid: FileId) {
        if let Some(file) = self.files.drop_ref(fid) {
            self.file_teardown(file);
        }
    }

    fn file_teardown(&mut self, file: File) {
        match file.back {
            FileBack::Inode(idx) => self.fs.iclose(&mut *self.disk, idx),
            FileBack::Dev(_) => {}
            FileBack::Pipe(pipe) => {
                let cond = self.pipes.get(pipe).cond;
                // quem dorme na condição precisa ver a ponta fechada
                self.pipe_wake_all(cond);
                let mut freed = false;
                if file.flags.readable() {
                    freed = self.pipes.close_end(&mut self.sems, pipe, false);
                }
                if !freed && file.flags.writable() {
                    self.pipes.close_end(&mut self.sems, pipe, true);
                }
            }
        }
    }
}
