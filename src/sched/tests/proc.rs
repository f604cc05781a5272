//! Testes da tabela de PCBs.

use crate::sched::config::PCB_NUM;
use crate::sched::proc::{PcbTable, ProcState};
use crate::sync::sem::SemTable;

fn setup() -> (SemTable, PcbTable) {
    let mut sems = SemTable::new();
    let procs = PcbTable::new(&mut sems);
    (sems, procs)
}

#[test]
fn test_root_lives_in_slot_zero() {
    let (_, procs) = setup();
    let root = procs.get(0);
    assert_eq!(root.pid, 0);
    assert_eq!(root.state, ProcState::Running);
    assert_eq!(root.threads, [0]);
}

#[test]
fn test_alloc_never_hands_out_slot_zero() {
    let (mut sems, mut procs) = setup();
    for _ in 0..PCB_NUM - 1 {
        assert_ne!(procs.alloc(&mut sems).unwrap(), 0);
    }
    assert!(procs.alloc(&mut sems).is_err());
}

#[test]
fn test_pids_are_global_and_monotonic() {
    let (mut sems, mut procs) = setup();
    let a = procs.alloc(&mut sems).unwrap();
    let b = procs.alloc(&mut sems).unwrap();
    let pid_a = procs.get(a).pid;
    let pid_b = procs.get(b).pid;
    assert!(pid_b > pid_a);

    // o slot volta, o pid não
    procs.release(a);
    let c = procs.alloc(&mut sems).unwrap();
    assert_eq!(c, a);
    assert!(procs.get(c).pid > pid_b);
}

#[test]
fn test_alloc_resets_slot_state() {
    let (mut sems, mut procs) = setup();
    let id = procs.alloc(&mut sems).unwrap();
    {
        let pcb = procs.get_mut(id);
        pcb.state = ProcState::Running;
        pcb.child_num = 3;
        pcb.sig_blocked = 0xff;
        pcb.sig_queue.push_back(10);
    }
    procs.release(id);
    assert_eq!(procs.get(id).state, ProcState::Unused);

    let again = procs.alloc(&mut sems).unwrap();
    assert_eq!(again, id);
    let pcb = procs.get(again);
    assert_eq!(pcb.state, ProcState::Uninit);
    assert_eq!(pcb.child_num, 0);
    assert_eq!(pcb.sig_blocked, 0);
    assert!(pcb.sig_queue.is_empty());
    assert_eq!(pcb.group_leader, again);
    assert_eq!(pcb.threads, [again]);
}

#[test]
fn test_pid2pcb_ignores_dead_slots() {
    let (mut sems, mut procs) = setup();
    let id = procs.alloc(&mut sems).unwrap();
    let pid = procs.get(id).pid;
    assert_eq!(procs.pid2pcb(pid), Some(id));
    procs.release(id);
    assert_eq!(procs.pid2pcb(pid), None);
}

#[test]
fn test_findzombie_matches_parent() {
    let (mut sems, mut procs) = setup();
    let parent = procs.alloc(&mut sems).unwrap();
    let child = procs.alloc(&mut sems).unwrap();
    let other = procs.alloc(&mut sems).unwrap();
    procs.get_mut(child).parent = Some(parent);
    procs.get_mut(other).parent = Some(0);

    assert_eq!(procs.findzombie(parent), None);
    procs.get_mut(child).state = ProcState::Zombie;
    assert_eq!(procs.findzombie(parent), Some(child));
    assert_eq!(procs.findzombie(0), None);
    procs.get_mut(other).state = ProcState::Zombie;
    assert_eq!(procs.findzombie(0), Some(other));
}
