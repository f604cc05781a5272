//! Formato do disco.
//!
//! O volume é plano: blocos 0..63 reservados (boot + kernel), superbloco
//! no bloco 32, bitmap de blocos livres logo depois, área de inodes em
//! seguida e dados no resto. Todos os inteiros em disco são little-endian.
//!
//! Layout de um dinode (64 bytes):
//!   [0..2)   tipo
//!   [2..4)   contagem de links
//!   [4..8)   número de dispositivo (tipo Dev)
//!   [8..12)  tamanho em bytes
//!   [12..64) 12 ponteiros diretos + 1 indireto

use crate::hal::BlockDevice;
use crate::sched::config::{BLK_SIZE, MAX_NAME, NDIRECT, RESERVED_BLKS, SUPER_BLK};

// === Superbloco ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuperBlock {
    /// Bloco do bitmap de blocos livres.
    pub bitmap: u32,
    /// Primeiro bloco da área de inodes.
    pub istart: u32,
    /// Total de inodes no volume.
    pub inum: u32,
    /// Inode do diretório raiz.
    pub root: u32,
}

impl SuperBlock {
    pub fn read(disk: &mut dyn BlockDevice) -> Self {
        let mut buf = [0u8; 16];
        disk.bread(&mut buf, SUPER_BLK, 0);
        Self {
            bitmap: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            istart: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            inum: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            root: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
        }
    }

    pub fn write(&self, disk: &mut dyn BlockDevice) {
        let mut buf = [0u8; 16];
        buf[0..4].copy_from_slice(&self.bitmap.to_le_bytes());
        buf[4..8].copy_from_slice(&self.istart.to_le_bytes());
        buf[8..12].copy_from_slice(&self.inum.to_le_bytes());
        buf[12..16].copy_from_slice(&self.root.to_le_bytes());
        disk.bwrite(&buf, SUPER_BLK, 0);
    }
}

// === Inodes ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum InodeType {
    #[default]
    None = 0,
    File = 1,
    Dir = 2,
    Dev = 3,
    Symlink = 4,
    Fifo = 5,
}

impl InodeType {
    pub fn from_u16(v: u16) -> Self {
        match v {
            1 => InodeType::File,
            2 => InodeType::Dir,
            3 => InodeType::Dev,
            4 => InodeType::Symlink,
            5 => InodeType::Fifo,
            _ => InodeType::None,
        }
    }
}

pub const DINODE_SIZE: usize = 64;
pub const IPERBLK: u32 = BLK_SIZE / DINODE_SIZE as u32;

/// Imagem em disco de um inode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dinode {
    pub ty: InodeType,
    pub links: u16,
    pub device: u32,
    pub size: u32,
    pub addrs: [u32; NDIRECT + 1],
}

impl Dinode {
    fn blk_of(sb: &SuperBlock, ino: u32) -> (u32, usize) {
        (
            sb.istart + ino / IPERBLK,
            (ino % IPERBLK) as usize * DINODE_SIZE,
        )
    }

    pub fn read(disk: &mut dyn BlockDevice, sb: &SuperBlock, ino: u32) -> Self {
        let (blk, off) = Self::blk_of(sb, ino);
        let mut buf = [0u8; DINODE_SIZE];
        disk.bread(&mut buf, blk, off);
        let mut addrs = [0u32; NDIRECT + 1];
        for (i, a) in addrs.iter_mut().enumerate() {
            let base = 12 + i * 4;
            *a = u32::from_le_bytes([buf[base], buf[base + 1], buf[base + 2], buf[base + 3]]);
        }
        Self {
            ty: InodeType::from_u16(u16::from_le_bytes([buf[0], buf[1]])),
            links: u16::from_le_bytes([buf[2], buf[3]]),
            device: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            size: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            addrs,
        }
    }

    pub fn write(&self, disk: &mut dyn BlockDevice, sb: &SuperBlock, ino: u32) {
        let (blk, off) = Self::blk_of(sb, ino);
        let mut buf = [0u8; DINODE_SIZE];
        buf[0..2].copy_from_slice(&(self.ty as u16).to_le_bytes());
        buf[2..4].copy_from_slice(&self.links.to_le_bytes());
        buf[4..8].copy_from_slice(&self.device.to_le_bytes());
        buf[8..12].copy_from_slice(&self.size.to_le_bytes());
        for (i, a) in self.addrs.iter().enumerate() {
            let base = 12 + i * 4;
            buf[base..base + 4].copy_from_slice(&a.to_le_bytes());
        }
        disk.bwrite(&buf, blk, off);
    }
}

// === Entradas de diretório ===

pub const DIRENT_SIZE: usize = 32;

/// Entrada de diretório: inode + nome (NUL-padded). `ino == 0` marca slot
/// vago, reutilizável.
#[derive(Debug, Clone, Copy)]
pub struct Dirent {
    pub ino: u32,
    pub name: [u8; MAX_NAME + 1],
}

impl Dirent {
    pub fn new(ino: u32, name: &str) -> Self {
        let mut buf = [0u8; MAX_NAME + 1];
        let bytes = name.as_bytes();
        buf[..bytes.len()].copy_from_slice(bytes);
        Self { ino, name: buf }
    }

    pub fn decode(buf: &[u8]) -> Self {
        let mut name = [0u8; MAX_NAME + 1];
        name.copy_from_slice(&buf[4..DIRENT_SIZE]);
        Self {
            ino: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            name,
        }
    }

    pub fn encode(&self) -> [u8; DIRENT_SIZE] {
        let mut buf = [0u8; DIRENT_SIZE];
        buf[0..4].copy_from_slice(&self.ino.to_le_bytes());
        buf[4..DIRENT_SIZE].copy_from_slice(&self.name);
        buf
    }

    /// O nome bate com `name`?
    pub fn is_named(&self, name: &str) -> bool {
        let bytes = name.as_bytes();
        if bytes.len() > MAX_NAME {
            return false;
        }
        &self.name[..bytes.len()] == bytes && self.name[bytes.len()] == 0
    }
}

// === mkfs ===

/// Formata o volume: superbloco, bitmap, área de inodes e raiz com "." e
/// "..". Um único bloco de bitmap cobre até 4096 blocos.
pub fn mkfs(disk: &mut dyn BlockDevice, blocks: u32) {
    assert!(blocks <= BLK_SIZE * 8);
    assert!(blocks > RESERVED_BLKS + 1);

    let sb = SuperBlock {
        bitmap: SUPER_BLK + 1,
        istart: SUPER_BLK + 2,
        inum: 128,
        root: 1,
    };
    sb.write(disk);

    // Bitmap zerado, depois blocos reservados + o bloco de dados da raiz.
    let zero = [0u8; BLK_SIZE as usize];
    disk.bwrite(&zero, sb.bitmap, 0);
    let root_blk = RESERVED_BLKS;
    let mut bitmap = [0u8; BLK_SIZE as usize];
    for blk in 0..=root_blk {
        bitmap[(blk / 8) as usize] |= 1 << (blk % 8);
    }
    disk.bwrite(&bitmap, sb.bitmap, 0);

    // Área de inodes zerada.
    let iblocks = (sb.inum + IPERBLK - 1) / IPERBLK;
    for blk in sb.istart..sb.istart + iblocks {
        disk.bwrite(&zero, blk, 0);
    }

    // Raiz: inode 1, um bloco de dados com "." e "..".
    let mut root = Dinode {
        ty: InodeType::Dir,
        links: 1,
        device: 0,
        size: 2 * DIRENT_SIZE as u32,
        addrs: [0u32; NDIRECT + 1],
    };
    root.addrs[0] = root_blk;
    root.write(disk, &sb, sb.root);

    disk.bwrite(&zero, root_blk, 0);
    disk.bwrite(&Dirent::new(sb.root, ".").encode(), root_blk, 0);
    disk.bwrite(&Dirent::new(sb.root, "..").encode(), root_blk, DIRENT_SIZE);

    crate::kinfo!("(FS) mkfs completo, blocos=", blocks as u64);
}
