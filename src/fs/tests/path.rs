//! Testes de resolução de caminhos, diretórios e links.

use crate::fs::layout::InodeType;
use crate::fs::path::skipelem;
use crate::fs::tests::fresh_fs;
use crate::sys::error::SysError;

#[test]
fn test_skipelem_splits_path() {
    assert_eq!(skipelem("/a/b/c"), Some(("a", "/b/c")));
    assert_eq!(skipelem("a"), Some(("a", "")));
    assert_eq!(skipelem("///x//y"), Some(("x", "//y")));
    assert_eq!(skipelem("/"), None);
    assert_eq!(skipelem(""), None);
}

#[test]
fn test_create_and_lookup_nested() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let dir = fs
        .icreate(&mut disk, root, "dir", InodeType::Dir, 0)
        .unwrap();
    let file = fs
        .icreate(&mut disk, dir, "nota", InodeType::File, 0)
        .unwrap();
    fs.iwrite(&mut disk, file, 0, b"ola").unwrap();
    fs.iclose(&mut disk, file);
    fs.iclose(&mut disk, dir);

    let found = fs.iopen(&mut disk, root, "/dir/nota").unwrap();
    let mut buf = [0u8; 3];
    assert_eq!(fs.iread(&mut disk, found, 0, &mut buf), 3);
    assert_eq!(&buf, b"ola");
    fs.iclose(&mut disk, found);
}

#[test]
fn test_relative_paths_and_dotdot() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let dir = fs
        .icreate(&mut disk, root, "sub", InodeType::Dir, 0)
        .unwrap();
    fs.icreate(&mut disk, root, "topo", InodeType::File, 0)
        .map(|f| fs.iclose(&mut disk, f))
        .unwrap();

    let via_dotdot = fs.iopen(&mut disk, dir, "../topo").unwrap();
    assert_eq!(fs.get(via_dotdot).ty, InodeType::File);
    fs.iclose(&mut disk, via_dotdot);
    fs.iclose(&mut disk, dir);
}

#[test]
fn test_lookup_missing_is_not_found() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    assert_eq!(
        fs.iopen(&mut disk, root, "/nao/existe").unwrap_err(),
        SysError::NotFound
    );
}

#[test]
fn test_duplicate_create_rejected() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let a = fs
        .icreate(&mut disk, root, "x", InodeType::File, 0)
        .unwrap();
    fs.iclose(&mut disk, a);
    assert_eq!(
        fs.icreate(&mut disk, root, "x", InodeType::File, 0)
            .unwrap_err(),
        SysError::AlreadyExists
    );
}

#[test]
fn test_iremove_clears_slot_for_reuse() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    for name in ["a", "b", "c"] {
        let f = fs
            .icreate(&mut disk, root, name, InodeType::File, 0)
            .unwrap();
        fs.iclose(&mut disk, f);
    }
    let size_before = fs.get(root).size;
    let (_, ty) = fs.iremove(&mut disk, root, "b").unwrap();
    assert_eq!(ty, InodeType::File);
    assert!(fs.ilookup(&mut disk, root, "b").is_none());

    // slot vago é reaproveitado: o diretório não cresce
    let f = fs
        .icreate(&mut disk, root, "novo", InodeType::File, 0)
        .unwrap();
    fs.iclose(&mut disk, f);
    assert_eq!(fs.get(root).size, size_before);
}

#[test]
fn test_iremove_nonempty_dir_fails() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let dir = fs
        .icreate(&mut disk, root, "d", InodeType::Dir, 0)
        .unwrap();
    let f = fs
        .icreate(&mut disk, dir, "dentro", InodeType::File, 0)
        .unwrap();
    fs.iclose(&mut disk, f);
    fs.iclose(&mut disk, dir);

    assert_eq!(
        fs.iremove(&mut disk, root, "d").unwrap_err(),
        SysError::InvalidArgument
    );
    // esvaziando, a remoção passa
    let dir = fs.iopen(&mut disk, root, "d").unwrap();
    fs.iremove(&mut disk, dir, "dentro").unwrap();
    fs.iclose(&mut disk, dir);
    fs.iremove(&mut disk, root, "d").unwrap();
}

#[test]
fn test_hard_link_shares_inode() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let f = fs
        .icreate(&mut disk, root, "orig", InodeType::File, 0)
        .unwrap();
    fs.iwrite(&mut disk, f, 0, b"dados").unwrap();
    fs.iclose(&mut disk, f);

    fs.ilink(&mut disk, root, "orig", "copia").unwrap();
    let a = fs.iopen(&mut disk, root, "orig").unwrap();
    let b = fs.iopen(&mut disk, root, "copia").unwrap();
    assert_eq!(a, b);
    assert_eq!(fs.get(a).links, 2);
    fs.iclose(&mut disk, a);
    fs.iclose(&mut disk, b);

    // removendo um nome, o conteúdo segue vivo pelo outro
    fs.iremove(&mut disk, root, "orig").unwrap();
    let c = fs.iopen(&mut disk, root, "copia").unwrap();
    let mut buf = [0u8; 5];
    assert_eq!(fs.iread(&mut disk, c, 0, &mut buf), 5);
    assert_eq!(&buf, b"dados");
    fs.iclose(&mut disk, c);
}

#[test]
fn test_link_to_dir_rejected() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let d = fs
        .icreate(&mut disk, root, "d", InodeType::Dir, 0)
        .unwrap();
    fs.iclose(&mut disk, d);
    assert_eq!(
        fs.ilink(&mut disk, root, "d", "d2").unwrap_err(),
        SysError::PermissionDenied
    );
}

#[test]
fn test_symlink_followed_only_as_last_component() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let dir = fs
        .icreate(&mut disk, root, "real", InodeType::Dir, 0)
        .unwrap();
    let f = fs
        .icreate(&mut disk, dir, "alvo", InodeType::File, 0)
        .unwrap();
    fs.iclose(&mut disk, f);
    fs.iclose(&mut disk, dir);

    let link = fs
        .icreate(&mut disk, root, "atalho", InodeType::Symlink, 0)
        .unwrap();
    fs.iwrite(&mut disk, link, 0, b"/real").unwrap();
    fs.iclose(&mut disk, link);

    // como último componente o link é seguido até o diretório
    let found = fs.iopen(&mut disk, root, "/atalho").unwrap();
    assert_eq!(fs.get(found).ty, InodeType::Dir);
    fs.iclose(&mut disk, found);

    // no meio do caminho não: o link não conta como diretório
    assert_eq!(
        fs.iopen(&mut disk, root, "/atalho/alvo").unwrap_err(),
        SysError::NotFound
    );
}

#[test]
fn test_symlink_cycle_detected() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    for (name, target) in [("um", "/dois"), ("dois", "/um")] {
        let l = fs
            .icreate(&mut disk, root, name, InodeType::Symlink, 0)
            .unwrap();
        fs.iwrite(&mut disk, l, 0, target.as_bytes()).unwrap();
        fs.iclose(&mut disk, l);
    }
    assert_eq!(
        fs.iopen(&mut disk, root, "/um").unwrap_err(),
        SysError::NotFound
    );
}

#[test]
fn test_iopen_parent_returns_last_name() {
    let (mut disk, mut fs) = fresh_fs();
    let root = fs.root;
    let dir = fs
        .icreate(&mut disk, root, "pasta", InodeType::Dir, 0)
        .unwrap();
    fs.iclose(&mut disk, dir);

    let (parent, name) = fs.iopen_parent(&mut disk, root, "/pasta/arquivo").unwrap();
    assert_eq!(name, "arquivo");
    assert_eq!(fs.get(parent).ty, InodeType::Dir);
    assert_ne!(parent, root);
    fs.iclose(&mut disk, parent);

    let (parent, name) = fs.iopen_parent(&mut disk, root, "solto").unwrap();
    assert_eq!(name, "solto");
    assert_eq!(parent, root);
    fs.iclose(&mut disk, parent);
}
