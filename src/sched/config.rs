//! Limites e parâmetros globais do sistema.
//!
//! Tudo aqui é fixado em tempo de compilação; as tabelas do kernel são
//! arrays estáticos dimensionados por estes valores.

// === Processos e threads ===

/// Entradas na tabela de PCBs. O slot 0 é sempre a raiz do kernel.
pub const PCB_NUM: usize = 64;

/// Semáforos de usuário abertos por processo.
pub const MAX_USEM: usize = 32;

/// Descritores de arquivo por processo.
pub const MAX_UFILE: usize = 32;

/// Sinais distintos (valores válidos em `kill` são 1..SIGNAL_NUM).
pub const SIGNAL_NUM: usize = 32;

// === Tabelas globais ===

/// Semáforos de usuário no sistema inteiro.
pub const USER_SEM_NUM: usize = 128;

/// Handles de arquivo abertos no sistema inteiro.
pub const TOTAL_FILE: usize = 128;

/// Pipes e FIFOs simultâneos.
pub const PIPE_NUM: usize = 32;

/// Capacidade do buffer circular de um pipe, em bytes.
pub const PIPE_BUF: usize = 512;

/// Entradas na cache de inodes.
pub const INODE_NUM: usize = 128;

/// Capacidade da arena central de semáforos do kernel.
pub const KSEM_NUM: usize = 512;

// === Disco ===

/// Tamanho de bloco em bytes.
pub const BLK_SIZE: u32 = 512;

/// Bloco onde vive o superbloco.
pub const SUPER_BLK: u32 = 32;

/// Blocos reservados para boot + kernel; nunca alocados para dados.
pub const RESERVED_BLKS: u32 = 64;

/// Ponteiros diretos por inode.
pub const NDIRECT: usize = 12;

/// Ponteiros num bloco indireto.
pub const NINDIRECT: usize = (BLK_SIZE / 4) as usize;

/// Maior nome de entrada de diretório (27 bytes + NUL).
pub const MAX_NAME: usize = 27;

/// Profundidade máxima de resolução de symlinks.
pub const SYMLINK_MAX_DEPTH: usize = 40;

// === Memória ===

/// Tamanho de página.
pub const PAGE_SIZE: u32 = 4096;

/// Início da região de heap do usuário (`brk` cresce a partir daqui).
pub const USR_MEM: u32 = 0x4000_0000;

/// Início da janela de `mmap`; varrida página a página.
pub const VIR_MEM: u32 = 0x5000_0000;
