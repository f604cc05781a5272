//! Mocks da HAL para testes em host.
//!
//! Cada mock guarda o estado num `Arc` para que o teste mantenha um clone
//! do handle entregue ao kernel e possa inspecionar ou alterar o estado
//! por fora (escrever na memória de usuário, avançar o relógio).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::hal::{BlockDevice, DevOps, Loader, TickSource, VirtMem};
use crate::sched::config::{BLK_SIZE, PAGE_SIZE};
use crate::sys::context::Context;
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::{Space, USER_CODE_SEL, USER_DATA_SEL, USER_EFLAGS};

// === Disco ===

/// Disco em memória, endereçado em blocos de 512 bytes.
#[derive(Clone)]
pub struct MockDisk {
    data: Arc<Mutex<Vec<u8>>>,
}

impl MockDisk {
    pub fn new(blocks: usize) -> Self {
        Self {
            data: Arc::new(Mutex::new(vec![0u8; blocks * BLK_SIZE as usize])),
        }
    }
}

impl BlockDevice for MockDisk {
    fn bread(&mut self, buf: &mut [u8], blkno: u32, off: usize) {
        assert!(off + buf.len() <= BLK_SIZE as usize);
        let data = self.data.lock().unwrap();
        let base = blkno as usize * BLK_SIZE as usize + off;
        buf.copy_from_slice(&data[base..base + buf.len()]);
    }

    fn bwrite(&mut self, buf: &[u8], blkno: u32, off: usize) {
        assert!(off + buf.len() <= BLK_SIZE as usize);
        let mut data = self.data.lock().unwrap();
        let base = blkno as usize * BLK_SIZE as usize + off;
        data[base..base + buf.len()].copy_from_slice(buf);
    }
}

// === Memória virtual ===

struct SpaceState {
    // página base -> conteúdo
    pages: BTreeMap<u32, Box<[u8]>>,
}

struct VmInner {
    spaces: Vec<Option<SpaceState>>,
}

/// Espaços de endereçamento simulados por um mapa de páginas em memória.
#[derive(Clone)]
pub struct MockVm {
    inner: Arc<Mutex<VmInner>>,
}

impl MockVm {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VmInner { spaces: Vec::new() })),
        }
    }

    /// Escreve bytes na memória de um espaço, por fora do kernel.
    pub fn poke(&self, space: Space, va: u32, bytes: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        let state = inner.spaces[space.0 as usize].as_mut().unwrap();
        for (i, byte) in bytes.iter().enumerate() {
            let addr = va + i as u32;
            let page = state
                .pages
                .get_mut(&(addr & !(PAGE_SIZE - 1)))
                .unwrap();
            page[(addr % PAGE_SIZE) as usize] = *byte;
        }
    }

    /// Lê bytes da memória de um espaço, por fora do kernel.
    pub fn peek(&self, space: Space, va: u32, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.read(space, va, &mut buf).unwrap();
        buf
    }

    pub fn poke_u32(&self, space: Space, va: u32, val: u32) {
        self.poke(space, va, &val.to_le_bytes());
    }

    pub fn peek_u32(&self, space: Space, va: u32) -> u32 {
        let b = self.peek(space, va, 4);
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    /// Escreve uma string C (com NUL final) num espaço.
    pub fn poke_cstr(&self, space: Space, va: u32, s: &str) {
        self.poke(space, va, s.as_bytes());
        self.poke(space, va + s.len() as u32, &[0u8]);
    }
}

impl VirtMem for MockVm {
    fn space_alloc(&mut self) -> SysResult<Space> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.spaces.len() as u32;
        inner.spaces.push(Some(SpaceState {
            pages: BTreeMap::new(),
        }));
        Ok(Space(id))
    }

    fn space_teardown(&mut self, space: Space) {
        let mut inner = self.inner.lock().unwrap();
        inner.spaces[space.0 as usize] = None;
    }

    fn space_clone(&mut self, src: Space) -> SysResult<Space> {
        let mut inner = self.inner.lock().unwrap();
        let pages = match &inner.spaces[src.0 as usize] {
            Some(state) => state.pages.clone(),
            None => return Err(SysError::BadHandle),
        };
        let id = inner.spaces.len() as u32;
        inner.spaces.push(Some(SpaceState { pages }));
        Ok(Space(id))
    }

    fn map(&mut self, space: Space, va: u32, len: u32) -> SysResult<()> {
        assert_eq!(va % PAGE_SIZE, 0);
        let mut inner = self.inner.lock().unwrap();
        let state = inner.spaces[space.0 as usize]
            .as_mut()
            .ok_or(SysError::BadHandle)?;
        let mut page = va;
        while page < va + len {
            state
                .pages
                .entry(page)
                .or_insert_with(|| vec![0u8; PAGE_SIZE as usize].into_boxed_slice());
            page += PAGE_SIZE;
        }
        Ok(())
    }

    fn unmap(&mut self, space: Space, va: u32, len: u32) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(state) = inner.spaces[space.0 as usize].as_mut() {
            let mut page = va;
            while page < va + len {
                state.pages.remove(&page);
                page += PAGE_SIZE;
            }
        }
    }

    fn is_mapped(&self, space: Space, va: u32) -> bool {
        let inner = self.inner.lock().unwrap();
        match &inner.spaces[space.0 as usize] {
            Some(state) => state.pages.contains_key(&(va & !(PAGE_SIZE - 1))),
            None => false,
        }
    }

    fn read(&self, space: Space, va: u32, buf: &mut [u8]) -> SysResult<()> {
        let inner = self.inner.lock().unwrap();
        let state = inner.spaces[space.0 as usize]
            .as_ref()
            .ok_or(SysError::BadAddress)?;
        for (i, byte) in buf.iter_mut().enumerate() {
            let addr = va + i as u32;
            let page = state
                .pages
                .get(&(addr & !(PAGE_SIZE - 1)))
                .ok_or(SysError::BadAddress)?;
            *byte = page[(addr % PAGE_SIZE) as usize];
        }
        Ok(())
    }

    fn write(&mut self, space: Space, va: u32, buf: &[u8]) -> SysResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let state = inner.spaces[space.0 as usize]
            .as_mut()
            .ok_or(SysError::BadAddress)?;
        for (i, byte) in buf.iter().enumerate() {
            let addr = va + i as u32;
            let page = state
                .pages
                .get_mut(&(addr & !(PAGE_SIZE - 1)))
                .ok_or(SysError::BadAddress)?;
            page[(addr % PAGE_SIZE) as usize] = *byte;
        }
        Ok(())
    }
}

// === Loader ===

pub const MOCK_IMG_BASE: u32 = 0x0010_0000;
pub const MOCK_IMG_LEN: u32 = 0x0001_0000;

/// Loader que mapeia uma janela fixa de 64 KiB e registra o que carregou.
#[derive(Clone)]
pub struct MockLoader {
    loaded: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    refuse: Arc<Mutex<Vec<String>>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self {
            loaded: Arc::new(Mutex::new(Vec::new())),
            refuse: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Faz o load deste caminho falhar com `NotFound`.
    pub fn refuse(&self, path: &str) {
        self.refuse.lock().unwrap().push(path.to_string());
    }

    pub fn loads(&self) -> Vec<(String, Vec<String>)> {
        self.loaded.lock().unwrap().clone()
    }
}

impl Loader for MockLoader {
    fn load(
        &mut self,
        vm: &mut dyn VirtMem,
        space: Space,
        path: &str,
        argv: &[&str],
        ctx: &mut Context,
    ) -> SysResult<()> {
        if self.refuse.lock().unwrap().iter().any(|p| p == path) {
            return Err(SysError::NotFound);
        }
        vm.map(space, MOCK_IMG_BASE, MOCK_IMG_LEN)?;
        *ctx = Context {
            eip: MOCK_IMG_BASE,
            esp: MOCK_IMG_BASE + MOCK_IMG_LEN,
            cs: USER_CODE_SEL,
            ds: USER_DATA_SEL,
            ss: USER_DATA_SEL,
            eflags: USER_EFLAGS,
            ..Context::default()
        };
        self.loaded.lock().unwrap().push((
            path.to_string(),
            argv.iter().map(|s| s.to_string()).collect(),
        ));
        Ok(())
    }
}

// === Relógio ===

/// Tick counter controlado pelo teste.
#[derive(Clone)]
pub struct MockClock {
    ticks: Arc<AtomicU64>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, n: u64) {
        self.ticks.fetch_add(n, Ordering::SeqCst);
    }
}

impl TickSource for MockClock {
    fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

// === Dispositivo de caractere ===

/// Console simulado: entrada pré-carregada, saída capturada.
#[derive(Clone)]
pub struct MockConsole {
    input: Arc<Mutex<Vec<u8>>>,
    output: Arc<Mutex<Vec<u8>>>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self {
            input: Arc::new(Mutex::new(Vec::new())),
            output: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn feed(&self, bytes: &[u8]) {
        self.input.lock().unwrap().extend_from_slice(bytes);
    }

    pub fn output(&self) -> Vec<u8> {
        self.output.lock().unwrap().clone()
    }
}

impl DevOps for MockConsole {
    fn read(&mut self, buf: &mut [u8]) -> SysResult<usize> {
        let mut input = self.input.lock().unwrap();
        let n = buf.len().min(input.len());
        buf[..n].copy_from_slice(&input[..n]);
        input.drain(..n);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> SysResult<usize> {
        self.output.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
}
