//! Resolução de caminhos e operações de diretório.
//!
//! Caminhos absolutos partem da raiz, relativos do cwd do chamador.
//! Symlinks são seguidos em qualquer posição do caminho, com limite de
//! profundidade para cortar ciclos. Diretórios não contam links extras
//! por "." e ".."; todo diretório vive com `links == 1`.

use alloc::string::String;
use alloc::vec;

use crate::fs::inode::FsState;
use crate::fs::layout::{Dirent, InodeType, DIRENT_SIZE};
use crate::hal::BlockDevice;
use crate::sched::config::{MAX_NAME, SYMLINK_MAX_DEPTH};
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::{Ino, InodeIdx};

/// Separa o primeiro elemento do caminho. Devolve `(elemento, resto)`,
/// ou `None` se só sobraram barras.
pub fn skipelem(path: &str) -> Option<(&str, &str)> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    match path.find('/') {
        Some(pos) => Some((&path[..pos], &path[pos..])),
        None => Some((path, "")),
    }
}

impl FsState {
    /// Procura `name` no diretório. Devolve o inode e o offset do dirent.
    pub fn ilookup(
        &mut self,
        disk: &mut dyn BlockDevice,
        dir: InodeIdx,
        name: &str,
    ) -> Option<(Ino, u32)> {
        debug_assert_eq!(self.get(dir).ty, InodeType::Dir);
        let size = self.get(dir).size;
        let mut off = 0u32;
        while off < size {
            let mut buf = [0u8; DIRENT_SIZE];
            self.iread(disk, dir, off, &mut buf);
            let entry = Dirent::decode(&buf);
            if entry.ino != 0 && entry.is_named(name) {
                return Some((entry.ino, off));
            }
            off += DIRENT_SIZE as u32;
        }
        None
    }

    /// Insere `name -> ino` no diretório, reusando o primeiro slot vago.
    pub fn dirlink(
        &mut self,
        disk: &mut dyn BlockDevice,
        dir: InodeIdx,
        name: &str,
        ino: Ino,
    ) -> SysResult<()> {
        if name.is_empty() || name.len() > MAX_NAME {
            return Err(SysError::InvalidArgument);
        }
        if self.ilookup(disk, dir, name).is_some() {
            return Err(SysError::AlreadyExists);
        }
        let size = self.get(dir).size;
        let mut off = 0u32;
        while off < size {
            let mut buf = [0u8; DIRENT_SIZE];
            self.iread(disk, dir, off, &mut buf);
            if Dirent::decode(&buf).ino == 0 {
                break;
            }
            off += DIRENT_SIZE as u32;
        }
        self.iwrite(disk, dir, off, &Dirent::new(ino, name).encode())?;
        Ok(())
    }

    /// Lê o alvo de um symlink.
    pub fn readlink(&mut self, disk: &mut dyn BlockDevice, idx: InodeIdx) -> SysResult<String> {
        debug_assert_eq!(self.get(idx).ty, InodeType::Symlink);
        let size = self.get(idx).size as usize;
        let mut buf = vec![0u8; size];
        self.iread(disk, idx, 0, &mut buf);
        String::from_utf8(buf).map_err(|_| SysError::InvalidArgument)
    }

    /// Resolve um caminho completo. Só o último componente segue symlink;
    /// um symlink no meio do caminho não é diretório e a resolução falha.
    /// Devolve o slot com uma referência nova.
    pub fn iopen(
        &mut self,
        disk: &mut dyn BlockDevice,
        start: InodeIdx,
        path: &str,
    ) -> SysResult<InodeIdx> {
        self.iopen_depth(disk, start, path, 0)
    }

    fn iopen_depth(
        &mut self,
        disk: &mut dyn BlockDevice,
        start: InodeIdx,
        path: &str,
        depth: usize,
    ) -> SysResult<InodeIdx> {
        if depth > SYMLINK_MAX_DEPTH {
            crate::kwarn!("(FS) ciclo de symlinks em profundidade=", depth as u64);
            return Err(SysError::NotFound);
        }
        let mut cur = if path.starts_with('/') {
            self.idup(self.root)
        } else {
            self.idup(start)
        };
        let mut rest = path;
        while let Some((elem, r)) = skipelem(rest) {
            rest = r;
            if self.get(cur).ty != InodeType::Dir {
                self.iclose(disk, cur);
                return Err(SysError::NotFound);
            }
            let Some((ino, _)) = self.ilookup(disk, cur, elem) else {
                self.iclose(disk, cur);
                return Err(SysError::NotFound);
            };
            let next = match self.iget(disk, ino) {
                Ok(idx) => idx,
                Err(e) => {
                    self.iclose(disk, cur);
                    return Err(e);
                }
            };
            let last = skipelem(rest).is_none();
            if last && self.get(next).ty == InodeType::Symlink {
                let target = match self.readlink(disk, next) {
                    Ok(t) => t,
                    Err(e) => {
                        self.iclose(disk, next);
                        self.iclose(disk, cur);
                        return Err(e);
                    }
                };
                self.iclose(disk, next);
                // resolve relativo ao diretório onde o link mora
                let resolved = self.iopen_depth(disk, cur, &target, depth + 1);
                self.iclose(disk, cur);
                cur = resolved?;
            } else {
                self.iclose(disk, cur);
                cur = next;
            }
        }
        Ok(cur)
    }

    /// Resolve tudo menos o último elemento. Devolve o diretório pai (com
    /// referência nova) e o nome final.
    pub fn iopen_parent<'p>(
        &mut self,
        disk: &mut dyn BlockDevice,
        start: InodeIdx,
        path: &'p str,
    ) -> SysResult<(InodeIdx, &'p str)> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(SysError::InvalidArgument);
        }
        let (prefix, name) = match trimmed.rfind('/') {
            Some(pos) => (&trimmed[..pos + 1], &trimmed[pos + 1..]),
            None => ("", trimmed),
        };
        let parent = self.iopen(disk, start, prefix)?;
        if self.get(parent).ty != InodeType::Dir {
            self.iclose(disk, parent);
            return Err(SysError::NotFound);
        }
        Ok((parent, name))
    }

    /// Cria "." e ".." num diretório recém-alocado.
    pub fn idirinit(
        &mut self,
        disk: &mut dyn BlockDevice,
        dir: InodeIdx,
        parent: Ino,
    ) -> SysResult<()> {
        let me = self.get(dir).ino;
        self.iwrite(disk, dir, 0, &Dirent::new(me, ".").encode())?;
        self.iwrite(disk, dir, DIRENT_SIZE as u32, &Dirent::new(parent, "..").encode())?;
        Ok(())
    }

    /// O diretório só tem "." e ".."?
    pub fn idirempty(&mut self, disk: &mut dyn BlockDevice, dir: InodeIdx) -> bool {
        let size = self.get(dir).size;
        let mut off = 0u32;
        while off < size {
            let mut buf = [0u8; DIRENT_SIZE];
            self.iread(disk, dir, off, &mut buf);
            let entry = Dirent::decode(&buf);
            if entry.ino != 0 && !entry.is_named(".") && !entry.is_named("..") {
                return false;
            }
            off += DIRENT_SIZE as u32;
        }
        true
    }

    /// Cria um inode novo de tipo `ty` ligado como `name` em `parent`.
    pub fn icreate(
        &mut self,
        disk: &mut dyn BlockDevice,
        parent: InodeIdx,
        name: &str,
        ty: InodeType,
        device: u32,
    ) -> SysResult<InodeIdx> {
        if self.ilookup(disk, parent, name).is_some() {
            return Err(SysError::AlreadyExists);
        }
        let ino = crate::fs::alloc::dialloc(disk, &self.sb, ty);
        let idx = self.iget(disk, ino)?;
        {
            let inode = self.get_mut(idx);
            inode.links = 1;
            inode.device = device;
        }
        self.iupdate(disk, idx);
        if let Err(e) = self.dirlink(disk, parent, name, ino) {
            self.get_mut(idx).del = true;
            self.iclose(disk, idx);
            return Err(e);
        }
        if ty == InodeType::Dir {
            let parent_ino = self.get(parent).ino;
            self.idirinit(disk, idx, parent_ino)?;
        }
        crate::kdebug!("(FS) criado ino=", ino as u64);
        Ok(idx)
    }

    /// Remove a entrada `name` do diretório. Diretórios precisam estar
    /// vazios. O conteúdo só morre quando a última referência fechar.
    pub fn iremove(
        &mut self,
        disk: &mut dyn BlockDevice,
        parent: InodeIdx,
        name: &str,
    ) -> SysResult<(Ino, InodeType)> {
        if name == "." || name == ".." {
            return Err(SysError::InvalidArgument);
        }
        let (ino, off) = self
            .ilookup(disk, parent, name)
            .ok_or(SysError::NotFound)?;
        let target = self.iget(disk, ino)?;
        if self.get(target).ty == InodeType::Dir && !self.idirempty(disk, target) {
            self.iclose(disk, target);
            return Err(SysError::InvalidArgument);
        }
        // o dirent some sempre, mesmo com o inode ainda vivo em outros nomes
        self.iwrite(disk, parent, off, &[0u8; DIRENT_SIZE])?;
        let ty = self.get(target).ty;
        {
            let inode = self.get_mut(target);
            inode.links -= 1;
            if inode.links == 0 {
                inode.del = true;
            }
        }
        self.iupdate(disk, target);
        self.iclose(disk, target);
        Ok((ino, ty))
    }

    /// Hard link: `new` passa a apontar para o inode de `old`. Diretórios
    /// não podem ser linkados.
    pub fn ilink(
        &mut self,
        disk: &mut dyn BlockDevice,
        start: InodeIdx,
        old: &str,
        new: &str,
    ) -> SysResult<()> {
        let target = self.iopen(disk, start, old)?;
        if self.get(target).ty == InodeType::Dir {
            self.iclose(disk, target);
            return Err(SysError::PermissionDenied);
        }
        let (parent, name) = match self.iopen_parent(disk, start, new) {
            Ok(p) => p,
            Err(e) => {
                self.iclose(disk, target);
                return Err(e);
            }
        };
        let ino = self.get(target).ino;
        let linked = self.dirlink(disk, parent, name, ino);
        self.iclose(disk, parent);
        match linked {
            Ok(()) => {
                self.get_mut(target).links += 1;
                self.iupdate(disk, target);
                self.iclose(disk, target);
                Ok(())
            }
            Err(e) => {
                self.iclose(disk, target);
                Err(e)
            }
        }
    }
}
