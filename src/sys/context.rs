//! Snapshot de registradores salvo pelo trap handler.
//!
//! O layout segue o frame empilhado pelo stub de interrupção em modo
//! protegido (x86 de 32 bits). O kernel nunca executa `iret`: ele apenas
//! edita este snapshot; retornar dele é tarefa do colaborador de trap.

/// Contexto de CPU salvo na entrada de uma interrupção/syscall.
///
/// Convenção de syscall: número em `eax`, argumentos em
/// `ebx, ecx, edx, esi, edi`, retorno escrito de volta em `eax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Context {
    pub ds: u32,
    pub ebp: u32,
    pub edi: u32,
    pub esi: u32,
    pub edx: u32,
    pub ecx: u32,
    pub ebx: u32,
    pub eax: u32,
    pub irq: u32,
    pub errcode: u32,
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
    pub esp: u32,
    pub ss: u32,
}

impl Context {
    /// Argumentos de syscall na ordem da ABI (ebx, ecx, edx, esi, edi).
    pub fn syscall_args(&self) -> (u32, u32, u32, u32, u32) {
        (self.ebx, self.ecx, self.edx, self.esi, self.edi)
    }
}
