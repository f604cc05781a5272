//! Alocadores de blocos e inodes em disco.
//!
//! O bitmap de blocos é varrido em palavras de 32 bits. Disco cheio e
//! inodes esgotados são fatais; este kernel não propaga ENOSPC.

use crate::fs::layout::{Dinode, InodeType, SuperBlock};
use crate::hal::BlockDevice;
use crate::sched::config::{BLK_SIZE, RESERVED_BLKS};
use crate::sys::types::{BlkNo, Ino};

/// Aloca um bloco de dados, já zerado.
pub fn balloc(disk: &mut dyn BlockDevice, sb: &SuperBlock) -> BlkNo {
    let mut bitmap = [0u8; BLK_SIZE as usize];
    disk.bread(&mut bitmap, sb.bitmap, 0);

    for wi in 0..(BLK_SIZE as usize / 4) {
        let base = wi * 4;
        let word = u32::from_le_bytes([
            bitmap[base],
            bitmap[base + 1],
            bitmap[base + 2],
            bitmap[base + 3],
        ]);
        if word == u32::MAX {
            continue;
        }
        for bit in 0..32 {
            if word & (1 << bit) == 0 {
                let blkno = (wi * 32 + bit) as u32;
                let marked = word | (1 << bit);
                disk.bwrite(&marked.to_le_bytes(), sb.bitmap, base);
                let zero = [0u8; BLK_SIZE as usize];
                disk.bwrite(&zero, blkno, 0);
                crate::ktrace!("(FS) balloc blk=", blkno as u64);
                return blkno;
            }
        }
    }
    panic!("disco cheio");
}

/// Devolve um bloco ao bitmap.
pub fn bfree(disk: &mut dyn BlockDevice, sb: &SuperBlock, blkno: BlkNo) {
    assert!(blkno >= RESERVED_BLKS);
    let base = (blkno / 32) as usize * 4;
    let mut word_buf = [0u8; 4];
    disk.bread(&mut word_buf, sb.bitmap, base);
    let word = u32::from_le_bytes(word_buf);
    assert!(word & (1 << (blkno % 32)) != 0, "bloco ja livre");
    let cleared = word & !(1 << (blkno % 32));
    disk.bwrite(&cleared.to_le_bytes(), sb.bitmap, base);
    crate::ktrace!("(FS) bfree blk=", blkno as u64);
}

/// Aloca um inode do tipo dado. O inode 0 é sentinela e nunca sai daqui.
pub fn dialloc(disk: &mut dyn BlockDevice, sb: &SuperBlock, ty: InodeType) -> Ino {
    for ino in 1..sb.inum {
        let dinode = Dinode::read(disk, sb, ino);
        if dinode.ty == InodeType::None {
            let fresh = Dinode {
                ty,
                ..Dinode::default()
            };
            fresh.write(disk, sb, ino);
            crate::ktrace!("(FS) dialloc ino=", ino as u64);
            return ino;
        }
    }
    panic!("sem inodes livres");
}

/// Zera o dinode em disco.
pub fn difree(disk: &mut dyn BlockDevice, sb: &SuperBlock, ino: Ino) {
    debug_assert!(ino != 0 && ino < sb.inum);
    Dinode::default().write(disk, sb, ino);
}
