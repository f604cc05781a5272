//! Testes das syscalls de memória.

use crate::hal::VirtMem;
use crate::sched::config::{PAGE_SIZE, USR_MEM, VIR_MEM};
use crate::sys::error::SysError;
use crate::sys::numbers::*;
use crate::syscall::tests::Rig;

#[test]
fn test_brk_grows_by_pages() {
    let mut rig = Rig::boot();
    // primeira chamada só fixa a base
    assert_eq!(rig.syscall(SYS_BRK, [USR_MEM, 0, 0]), 0);
    assert!(!rig.vm.is_mapped(rig.space(), USR_MEM));

    // crescimento arredonda para cima e mapeia o trecho novo
    assert_eq!(rig.syscall(SYS_BRK, [USR_MEM + 10, 0, 0]), 0);
    assert!(rig.vm.is_mapped(rig.space(), USR_MEM));
    assert!(!rig.vm.is_mapped(rig.space(), USR_MEM + PAGE_SIZE));

    assert_eq!(rig.syscall(SYS_BRK, [USR_MEM + 3 * PAGE_SIZE, 0, 0]), 0);
    assert!(rig.vm.is_mapped(rig.space(), USR_MEM + 2 * PAGE_SIZE));

    // a área nova é usável de verdade
    rig.put(USR_MEM, b"heap");
    assert_eq!(rig.take(USR_MEM, 4), b"heap");
}

#[test]
fn test_brk_shrink_is_ignored() {
    let mut rig = Rig::boot();
    rig.syscall(SYS_BRK, [USR_MEM, 0, 0]);
    rig.syscall(SYS_BRK, [USR_MEM + 2 * PAGE_SIZE, 0, 0]);
    assert_eq!(rig.syscall(SYS_BRK, [USR_MEM, 0, 0]), 0);
    assert!(rig.vm.is_mapped(rig.space(), USR_MEM + PAGE_SIZE));
}

#[test]
fn test_brk_below_heap_base_rejected() {
    let mut rig = Rig::boot();
    assert_eq!(
        rig.syscall(SYS_BRK, [USR_MEM - PAGE_SIZE, 0, 0]),
        SysError::InvalidArgument.as_isize()
    );
}

#[test]
fn test_mmap_hands_out_pages_in_order() {
    let mut rig = Rig::boot();
    let a = rig.syscall(SYS_MMAP, [0; 3]);
    let b = rig.syscall(SYS_MMAP, [0; 3]);
    assert_eq!(a as u32, VIR_MEM);
    assert_eq!(b as u32, VIR_MEM + PAGE_SIZE);

    rig.put(a as u32, b"pagina");
    assert_eq!(rig.take(a as u32, 6), b"pagina");
}

#[test]
fn test_munmap_frees_the_page_for_reuse() {
    let mut rig = Rig::boot();
    let a = rig.syscall(SYS_MMAP, [0; 3]) as u32;
    let _b = rig.syscall(SYS_MMAP, [0; 3]) as u32;

    assert_eq!(rig.syscall(SYS_MUNMAP, [a, 0, 0]), 0);
    assert!(!rig.vm.is_mapped(rig.space(), a));

    // o buraco é a primeira página livre da janela
    assert_eq!(rig.syscall(SYS_MMAP, [0; 3]) as u32, a);
}

#[test]
fn test_munmap_validates_the_address() {
    let mut rig = Rig::boot();
    let a = rig.syscall(SYS_MMAP, [0; 3]) as u32;
    let bad = SysError::InvalidArgument.as_isize();

    assert_eq!(rig.syscall(SYS_MUNMAP, [a + 1, 0, 0]), bad);
    assert_eq!(rig.syscall(SYS_MUNMAP, [USR_MEM, 0, 0]), bad);
    assert_eq!(rig.syscall(SYS_MUNMAP, [a + 10 * PAGE_SIZE, 0, 0]), bad);

    assert_eq!(rig.syscall(SYS_MUNMAP, [a, 0, 0]), 0);
    assert_eq!(rig.syscall(SYS_MUNMAP, [a, 0, 0]), bad);
}
