//! Testes do buffer de pipe puro, sem processos.

use crate::ipc::pipe::{PipeIo, PipeTable};
use crate::sched::config::{PIPE_BUF, PIPE_NUM};
use crate::sync::sem::SemTable;

fn setup() -> (SemTable, PipeTable) {
    (SemTable::new(), PipeTable::new())
}

#[test]
fn test_write_then_read() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, None, true, true).unwrap();

    assert_eq!(pipes.write_step(id, b"abc"), PipeIo::Xfer(3));
    let mut buf = [0u8; 8];
    assert_eq!(pipes.read_step(id, &mut buf), PipeIo::Xfer(3));
    assert_eq!(&buf[..3], b"abc");
}

#[test]
fn test_empty_pipe_blocks_reader() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, None, true, true).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(pipes.read_step(id, &mut buf), PipeIo::WouldBlock);
}

#[test]
fn test_full_pipe_blocks_writer_and_partial_fill() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, None, true, true).unwrap();

    let data = [7u8; PIPE_BUF + 100];
    // só cabe um buffer; o resto fica para o próximo passo
    assert_eq!(pipes.write_step(id, &data), PipeIo::Xfer(PIPE_BUF));
    assert_eq!(pipes.write_step(id, &data[PIPE_BUF..]), PipeIo::WouldBlock);

    let mut out = [0u8; 100];
    assert_eq!(pipes.read_step(id, &mut out), PipeIo::Xfer(100));
    assert_eq!(pipes.write_step(id, &data[PIPE_BUF..]), PipeIo::Xfer(100));
}

#[test]
fn test_ring_wraps_around() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, None, true, true).unwrap();

    // desloca rpos para perto do fim e força a escrita a dar a volta
    let pad = [0u8; PIPE_BUF - 4];
    assert_eq!(pipes.write_step(id, &pad), PipeIo::Xfer(PIPE_BUF - 4));
    let mut sink = [0u8; PIPE_BUF - 4];
    assert_eq!(pipes.read_step(id, &mut sink), PipeIo::Xfer(PIPE_BUF - 4));

    let msg: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(pipes.write_step(id, &msg), PipeIo::Xfer(8));
    let mut out = [0u8; 8];
    assert_eq!(pipes.read_step(id, &mut out), PipeIo::Xfer(8));
    assert_eq!(out, msg);
}

#[test]
fn test_reader_sees_eof_after_writer_closes() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, None, true, true).unwrap();

    pipes.write_step(id, b"resto");
    assert!(!pipes.close_end(&mut sems, id, true));

    // o que já estava no buffer ainda sai; depois vem EOF
    let mut buf = [0u8; 16];
    assert_eq!(pipes.read_step(id, &mut buf), PipeIo::Xfer(5));
    assert_eq!(pipes.read_step(id, &mut buf), PipeIo::Eof);
}

#[test]
fn test_writer_sees_eof_when_reader_gone() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, None, true, true).unwrap();
    assert!(!pipes.close_end(&mut sems, id, false));
    assert_eq!(pipes.write_step(id, b"x"), PipeIo::Eof);
}

#[test]
fn test_close_both_ends_frees_slot_and_sems() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, None, true, true).unwrap();
    let (mutex, cond) = {
        let p = pipes.get(id);
        (p.mutex, p.cond)
    };

    assert!(!pipes.close_end(&mut sems, id, false));
    assert!(pipes.close_end(&mut sems, id, true));
    assert!(!pipes.is_open(id));

    // os semáforos voltaram para a arena
    let a = sems.alloc(0).unwrap();
    let b = sems.alloc(0).unwrap();
    let mut reclaimed = [a, b];
    reclaimed.sort_unstable();
    let mut expected = [mutex, cond];
    expected.sort_unstable();
    assert_eq!(reclaimed, expected);
}

#[test]
fn test_table_exhaustion() {
    let (mut sems, mut pipes) = setup();
    for _ in 0..PIPE_NUM {
        pipes.alloc(&mut sems, None, true, true).unwrap();
    }
    assert!(pipes.alloc(&mut sems, None, true, true).is_err());
}

#[test]
fn test_fifo_reader_waits_for_absent_writer() {
    let (mut sems, mut pipes) = setup();
    // FIFO aberto só para leitura: a outra ponta nunca abriu
    let id = pipes.alloc(&mut sems, Some(9), true, false).unwrap();
    let mut buf = [0u8; 4];
    // sem escritor ainda não é EOF; o leitor espera
    assert_eq!(pipes.read_step(id, &mut buf), PipeIo::WouldBlock);
}

#[test]
fn test_fifo_half_open_close_frees_slot() {
    let (mut sems, mut pipes) = setup();
    let id = pipes.alloc(&mut sems, Some(9), true, false).unwrap();
    let (mutex, cond) = {
        let p = pipes.get(id);
        (p.mutex, p.cond)
    };
    // fechar a única ponta que abriu devolve o slot e os semáforos
    assert!(pipes.close_end(&mut sems, id, false));
    assert!(!pipes.is_open(id));
    let a = sems.alloc(0).unwrap();
    let b = sems.alloc(0).unwrap();
    let mut reclaimed = [a, b];
    reclaimed.sort_unstable();
    let mut expected = [mutex, cond];
    expected.sort_unstable();
    assert_eq!(reclaimed, expected);
}

#[test]
fn test_fifo_key_lookup_and_detach() {
    let (mut sems, mut pipes) = setup();
    let anon = pipes.alloc(&mut sems, None, true, true).unwrap();
    let fifo = pipes.alloc(&mut sems, Some(42), true, true).unwrap();

    assert_eq!(pipes.fifo_lookup(42), Some(fifo));
    assert_eq!(pipes.fifo_lookup(7), None);

    pipes.rmfifo(42);
    assert_eq!(pipes.fifo_lookup(42), None);
    // o pipe em si continua utilizável
    assert!(pipes.is_open(fifo));
    assert!(pipes.is_open(anon));
}
