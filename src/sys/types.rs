//! Tipos básicos do kernel.
//!
//! Todas as tabelas do kernel são arenas de tamanho fixo; os "ponteiros"
//! entre subsistemas são índices estáveis dentro dessas arenas.

/// Identificador de processo/thread (cada PCB tem um pid único).
pub type Pid = u32;

/// Índice de um PCB na tabela de processos.
pub type PcbId = usize;

/// Handle de semáforo na arena central de semáforos.
pub type SemId = usize;

/// Índice na tabela de semáforos de usuário.
pub type UsemId = usize;

/// Índice na tabela global de arquivos abertos.
pub type FileId = usize;

/// Índice na tabela de pipes.
pub type PipeId = usize;

/// Índice de um inode na cache em memória.
pub type InodeIdx = usize;

/// Número de inode em disco (0 é reservado: dirent com inode 0 é slot livre).
pub type Ino = u32;

/// Número de bloco em disco.
pub type BlkNo = u32;

/// Identificador de device registrado.
pub type DevId = u32;

/// Handle opaco de espaço de endereçamento, emitido pelo colaborador de VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space(pub u32);

/// Seletores e flags usados ao montar contextos de usuário (modo protegido).
pub const USER_CODE_SEL: u32 = 0x1b;
pub const USER_DATA_SEL: u32 = 0x23;
pub const USER_EFLAGS: u32 = 0x202; // IF ligado
