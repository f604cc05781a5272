//! Heap do kernel.
//!
//! No alvo real o allocator global é o `linked_list_allocator`, inicializado
//! sobre uma região fixa antes de qualquer alocação. Nos testes em host o
//! allocator do std é usado diretamente.

#[cfg(all(not(test), target_os = "none"))]
use linked_list_allocator::LockedHeap;

/// Região do heap do kernel no espaço virtual.
pub const HEAP_START: usize = 0x0080_0000;
pub const HEAP_SIZE: usize = 1024 * 1024; // 1 MiB

#[cfg(all(not(test), target_os = "none"))]
#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Inicializa o heap. Deve rodar uma única vez, antes de criar o kernel.
#[cfg(all(not(test), target_os = "none"))]
pub fn init_heap() {
    unsafe {
        ALLOCATOR.lock().init(HEAP_START as *mut u8, HEAP_SIZE);
    }
    crate::kinfo!("(MM) Heap inicializado, bytes=", HEAP_SIZE as u64);
}

#[cfg(any(test, not(target_os = "none")))]
pub fn init_heap() {}
