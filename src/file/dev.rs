//! Registro de dispositivos de caractere.
//!
//! Nós de dispositivo no sistema de arquivos guardam só o número; as
//! operações de verdade ficam aqui, registradas no boot.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::hal::DevOps;
use crate::sys::error::{SysError, SysResult};
use crate::sys::types::DevId;

pub struct DevRegistry {
    devs: Vec<Box<dyn DevOps>>,
}

impl DevRegistry {
    pub fn new() -> Self {
        Self { devs: Vec::new() }
    }

    pub fn register(&mut self, ops: Box<dyn DevOps>) -> DevId {
        self.devs.push(ops);
        (self.devs.len() - 1) as DevId
    }

    pub fn get_mut(&mut self, dev: DevId) -> SysResult<&mut dyn DevOps> {
        match self.devs.get_mut(dev as usize) {
            Some(ops) => Ok(&mut **ops),
            None => Err(SysError::BadHandle),
        }
    }
}
