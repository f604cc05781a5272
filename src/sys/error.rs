//! Códigos de Erro do Brasa Kernel
//!
//! Sistema de erros unificado para todas as syscalls.
//! Erros são retornados como valores negativos em EAX.
//!
//! Condições fatais (endereçamento além de direto+indireto, heap do kernel
//! esgotada, disco cheio) NÃO passam por aqui: elas derrubam o kernel com
//! `panic!`, um limite de projeto herdado do desenho didático.

/// Enum de erros do sistema.
///
/// Valores são i32 para permitir representação negativa em isize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SysError {
    // === Erros Gerais (1-15) ===
    /// Operação não permitida (ex.: abrir diretório para escrita)
    PermissionDenied = 1,
    /// Objeto não encontrado (path, pid, fd, sem id)
    NotFound = 2,
    /// Objeto já existe (mkfifo/symlink sobre nome existente)
    AlreadyExists = 3,
    /// Argumento inválido (signo fora de faixa, whence desconhecido, self-join)
    InvalidArgument = 4,

    // === Erros de Handle (16-31) ===
    /// Handle/fd inválido ou fechado
    BadHandle = 16,
    /// Tabela cheia (PCB, inode, arquivo, pipe ou semáforo)
    ResourceExhausted = 17,

    // === Erros de Memória (32-47) ===
    /// Sem memória disponível
    OutOfMemory = 32,
    /// Endereço de usuário inválido ou não mapeado
    BadAddress = 33,

    // === Erros de IO (48-63) ===
    /// Operação sobre uma ponta de pipe já fechada
    Closed = 48,

    // === Erros de Sistema (240-255) ===
    /// Syscall não implementada
    NotImplemented = 254,
    /// Erro desconhecido
    Unknown = 255,
}

impl SysError {
    /// Converte para isize negativo (formato de retorno da syscall)
    #[inline]
    pub fn as_isize(self) -> isize {
        -(self as i32 as isize)
    }

    /// Cria erro a partir de código negativo
    pub fn from_code(code: isize) -> Option<Self> {
        if code >= 0 {
            return None;
        }
        let abs = (-code) as i32;
        match abs {
            1 => Some(Self::PermissionDenied),
            2 => Some(Self::NotFound),
            3 => Some(Self::AlreadyExists),
            4 => Some(Self::InvalidArgument),
            16 => Some(Self::BadHandle),
            17 => Some(Self::ResourceExhausted),
            32 => Some(Self::OutOfMemory),
            33 => Some(Self::BadAddress),
            48 => Some(Self::Closed),
            254 => Some(Self::NotImplemented),
            _ => Some(Self::Unknown),
        }
    }
}

/// Resultado de syscall: Ok(valor) ou Err(SysError)
pub type SysResult<T> = Result<T, SysError>;

/// Helper para converter SysResult<isize> em isize para retorno
pub fn result_to_isize(result: SysResult<isize>) -> isize {
    match result {
        Ok(val) => val,
        Err(e) => e.as_isize(),
    }
}
