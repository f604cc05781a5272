//! Cache de inodes em memória.
//!
//! Cada inode aberto ocupa um slot com contagem de referências. A remoção
//! é adiada: `unlink` marca `del` e o conteúdo só é liberado quando a
//! última referência fecha. Mutações são gravadas no disco na hora via
//! `iupdate`; o cache nunca fica sujo entre chamadas.

use crate::fs::alloc::{balloc, bfree, difree};
use crate::fs::layout::{Dinode, InodeType, SuperBlock};
use crate::hal::BlockDevice;
use crate::sched::config::{BLK_SIZE, INODE_NUM, NDIRECT, NINDIRECT};
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::{BlkNo, Ino, InodeIdx};

pub struct Inode {
    pub ino: Ino,
    pub refs: u32,
    pub del: bool,
    pub ty: InodeType,
    pub links: u16,
    pub device: u32,
    pub size: u32,
    pub addrs: [u32; NDIRECT + 1],
}

pub struct FsState {
    pub sb: SuperBlock,
    cache: [Option<Inode>; INODE_NUM],
    /// Slot fixo do diretório raiz; nunca é fechado.
    pub root: InodeIdx,
}

impl FsState {
    /// Lê o superbloco e abre a raiz. O slot da raiz fica vivo para sempre.
    pub fn boot(disk: &mut dyn BlockDevice) -> Self {
        let sb = SuperBlock::read(disk);
        assert!(sb.inum > 0, "superbloco invalido");
        let mut fs = Self {
            sb,
            cache: core::array::from_fn(|_| None),
            root: 0,
        };
        let root = match fs.iget(disk, sb.root) {
            Ok(idx) => idx,
            Err(_) => panic!("raiz inacessivel"),
        };
        fs.root = root;
        crate::kinfo!("(FS) Montado, inodes=", sb.inum as u64);
        fs
    }

    pub fn get(&self, idx: InodeIdx) -> &Inode {
        match self.cache[idx].as_ref() {
            Some(inode) => inode,
            None => panic!("slot de inode vazio"),
        }
    }

    pub fn get_mut(&mut self, idx: InodeIdx) -> &mut Inode {
        match self.cache[idx].as_mut() {
            Some(inode) => inode,
            None => panic!("slot de inode vazio"),
        }
    }

    /// Abre o inode `ino`: reusa o slot cacheado ou carrega do disco.
    pub fn iget(&mut self, disk: &mut dyn BlockDevice, ino: Ino) -> SysResult<InodeIdx> {
        if let Some(idx) = self
            .cache
            .iter()
            .position(|s| s.as_ref().is_some_and(|i| i.ino == ino))
        {
            self.get_mut(idx).refs += 1;
            return Ok(idx);
        }
        let idx = self
            .cache
            .iter()
            .position(|s| s.is_none())
            .ok_or(SysError::ResourceExhausted)?;
        let d = Dinode::read(disk, &self.sb, ino);
        if d.ty == InodeType::None {
            return Err(SysError::NotFound);
        }
        self.cache[idx] = Some(Inode {
            ino,
            refs: 1,
            del: false,
            ty: d.ty,
            links: d.links,
            device: d.device,
            size: d.size,
            addrs: d.addrs,
        });
        Ok(idx)
    }

    /// Mais uma referência ao slot.
    pub fn idup(&mut self, idx: InodeIdx) -> InodeIdx {
        self.get_mut(idx).refs += 1;
        idx
    }

    /// Solta uma referência. Com a última, um inode marcado `del` é
    /// truncado e devolvido ao disco.
    pub fn iclose(&mut self, disk: &mut dyn BlockDevice, idx: InodeIdx) {
        let inode = self.get_mut(idx);
        debug_assert!(inode.refs > 0);
        inode.refs -= 1;
        if inode.refs > 0 {
            return;
        }
        if inode.del {
            let ino = inode.ino;
            self.itrunc(disk, idx);
            difree(disk, &self.sb, ino);
            crate::kdebug!("(FS) inode destruido ino=", ino as u64);
        }
        self.cache[idx] = None;
    }

    /// Grava o dinode de volta no disco.
    pub fn iupdate(&mut self, disk: &mut dyn BlockDevice, idx: InodeIdx) {
        let inode = self.get(idx);
        let d = Dinode {
            ty: inode.ty,
            links: inode.links,
            device: inode.device,
            size: inode.size,
            addrs: inode.addrs,
        };
        d.write(disk, &self.sb, inode.ino);
    }

    /// Traduz índice de bloco lógico em bloco físico. Com `alloc`, blocos
    /// e o indireto são criados sob demanda. Além do indireto simples é
    /// fatal.
    pub fn iwalk(
        &mut self,
        disk: &mut dyn BlockDevice,
        idx: InodeIdx,
        bn: usize,
        alloc: bool,
    ) -> BlkNo {
        if bn < NDIRECT {
            let mut blk = self.get(idx).addrs[bn];
            if blk == 0 && alloc {
                blk = balloc(disk, &self.sb);
                self.get_mut(idx).addrs[bn] = blk;
                self.iupdate(disk, idx);
            }
            return blk;
        }
        let bn = bn - NDIRECT;
        assert!(bn < NINDIRECT, "arquivo grande demais");

        let mut ind = self.get(idx).addrs[NDIRECT];
        if ind == 0 {
            if !alloc {
                return 0;
            }
            ind = balloc(disk, &self.sb);
            self.get_mut(idx).addrs[NDIRECT] = ind;
            self.iupdate(disk, idx);
        }
        let mut entry = [0u8; 4];
        disk.bread(&mut entry, ind, bn * 4);
        let mut blk = u32::from_le_bytes(entry);
        if blk == 0 && alloc {
            blk = balloc(disk, &self.sb);
            disk.bwrite(&blk.to_le_bytes(), ind, bn * 4);
        }
        blk
    }

    /// Lê a partir de `off`, limitado ao tamanho do arquivo. Devolve
    /// quantos bytes saíram. Bloco não alocado dentro do tamanho lê zeros.
    pub fn iread(
        &mut self,
        disk: &mut dyn BlockDevice,
        idx: InodeIdx,
        off: u32,
        buf: &mut [u8],
    ) -> usize {
        let size = self.get(idx).size;
        if off >= size {
            return 0;
        }
        let total = buf.len().min((size - off) as usize);
        let mut done = 0usize;
        while done < total {
            let pos = off as usize + done;
            let bn = pos / BLK_SIZE as usize;
            let boff = pos % BLK_SIZE as usize;
            let n = (BLK_SIZE as usize - boff).min(total - done);
            let blk = self.iwalk(disk, idx, bn, false);
            if blk == 0 {
                buf[done..done + n].fill(0);
            } else {
                disk.bread(&mut buf[done..done + n], blk, boff);
            }
            done += n;
        }
        total
    }

    /// Escreve a partir de `off`, estendendo o arquivo se preciso. Começar
    /// além do fim é inválido: não existem buracos criados por seek.
    pub fn iwrite(
        &mut self,
        disk: &mut dyn BlockDevice,
        idx: InodeIdx,
        off: u32,
        buf: &[u8],
    ) -> SysResult<usize> {
        if off > self.get(idx).size {
            return Err(SysError::InvalidArgument);
        }
        let mut done = 0usize;
        while done < buf.len() {
            let pos = off as usize + done;
            let bn = pos / BLK_SIZE as usize;
            let boff = pos % BLK_SIZE as usize;
            let n = (BLK_SIZE as usize - boff).min(buf.len() - done);
            let blk = self.iwalk(disk, idx, bn, true);
            disk.bwrite(&buf[done..done + n], blk, boff);
            done += n;
        }
        let end = off + buf.len() as u32;
        let inode = self.get_mut(idx);
        if end > inode.size {
            inode.size = end;
        }
        self.iupdate(disk, idx);
        Ok(buf.len())
    }

    /// Libera todos os blocos de dados e zera o tamanho.
    pub fn itrunc(&mut self, disk: &mut dyn BlockDevice, idx: InodeIdx) {
        let addrs = self.get(idx).addrs;
        for blk in addrs.iter().take(NDIRECT) {
            if *blk != 0 {
                bfree(disk, &self.sb, *blk);
            }
        }
        let ind = addrs[NDIRECT];
        if ind != 0 {
            let mut table = [0u8; BLK_SIZE as usize];
            disk.bread(&mut table, ind, 0);
            for i in 0..NINDIRECT {
                let base = i * 4;
                let blk = u32::from_le_bytes([
                    table[base],
                    table[base + 1],
                    table[base + 2],
                    table[base + 3],
                ]);
                if blk != 0 {
                    bfree(disk, &self.sb, blk);
                }
            }
            bfree(disk, &self.sb, ind);
        }
        let inode = self.get_mut(idx);
        inode.addrs = [0u32; NDIRECT + 1];
        inode.size = 0;
        self.iupdate(disk, idx);
    }
}
