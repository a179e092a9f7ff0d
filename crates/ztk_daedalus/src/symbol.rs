use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use num_enum::TryFromPrimitive;

use ztk_io::Buffer;

use crate::{ScriptError, VmError};

/// The type of a script symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum Datatype {
    Void = 0,
    Float = 1,
    Int = 2,
    String = 3,
    Class = 4,
    Function = 5,
    Prototype = 6,
    Instance = 7,
}

impl Default for Datatype {
    fn default() -> Self {
        Self::Void
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SymbolFlags: u32 {
        const CONST = 1 << 0;
        const RETURN = 1 << 1;
        const MEMBER = 1 << 2;
        const EXTERNAL = 1 << 3;
        const MERGED = 1 << 4;
    }
}

/// A script object created from an instance symbol.
///
/// Member values are stored per instance, keyed by the member symbol's
/// table index; the runtime type is the resolved class symbol.
#[derive(Debug, Default)]
pub struct Instance {
    pub symbol_index: u32,
    pub class_index: i32,
    fields: HashMap<u32, FieldValue>,
}

pub type InstancePtr = Rc<RefCell<Instance>>;

#[derive(Debug, Clone)]
enum FieldValue {
    Int(Vec<i32>),
    Float(Vec<f32>),
    String(Vec<String>),
}

impl Instance {
    pub fn new(symbol_index: u32, class_index: i32) -> InstancePtr {
        Rc::new(RefCell::new(Instance {
            symbol_index,
            class_index,
            fields: HashMap::new(),
        }))
    }

    fn int(&self, member: u32, index: usize) -> i32 {
        match self.fields.get(&member) {
            Some(FieldValue::Int(values)) => values.get(index).copied().unwrap_or(0),
            _ => 0,
        }
    }

    fn float(&self, member: u32, index: usize) -> f32 {
        match self.fields.get(&member) {
            Some(FieldValue::Float(values)) => values.get(index).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn string(&self, member: u32, index: usize) -> String {
        match self.fields.get(&member) {
            Some(FieldValue::String(values)) => values.get(index).cloned().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn set_int(&mut self, member: u32, index: usize, value: i32) {
        let values = self
            .fields
            .entry(member)
            .or_insert_with(|| FieldValue::Int(Vec::new()));
        if let FieldValue::Int(values) = values {
            if values.len() <= index {
                values.resize(index + 1, 0);
            }
            values[index] = value;
        }
    }

    fn set_float(&mut self, member: u32, index: usize, value: f32) {
        let values = self
            .fields
            .entry(member)
            .or_insert_with(|| FieldValue::Float(Vec::new()));
        if let FieldValue::Float(values) = values {
            if values.len() <= index {
                values.resize(index + 1, 0.0);
            }
            values[index] = value;
        }
    }

    fn set_string(&mut self, member: u32, index: usize, value: String) {
        let values = self
            .fields
            .entry(member)
            .or_insert_with(|| FieldValue::String(Vec::new()));
        if let FieldValue::String(values) = values {
            if values.len() <= index {
                values.resize(index + 1, String::new());
            }
            values[index] = value;
        }
    }
}

/// Non-member symbol storage.
#[derive(Debug, Clone, Default)]
pub enum SymbolValue {
    #[default]
    None,
    Float(Vec<f32>),
    Int(Vec<i32>),
    String(Vec<String>),
    Instance(Option<InstancePtr>),
}

/// One entry of the script's symbol table.
#[derive(Debug, Clone, Default)]
pub struct Symbol {
    name: String,
    ty: Datatype,
    count: u32,
    flags: SymbolFlags,
    generated: bool,
    index: u32,
    parent: i32,
    member_offset: i32,
    class_size: i32,
    return_type: Datatype,
    class_offset: i32,
    address: u32,
    pub file_index: u32,
    pub line_start: u32,
    pub line_count: u32,
    pub char_start: u32,
    pub char_count: u32,
    value: SymbolValue,
}

impl Symbol {
    pub(crate) fn parse(buf: &mut Buffer) -> Result<Symbol, ScriptError> {
        let mut sym = Symbol::default();

        if buf.get_u32()? != 0 {
            sym.name = buf.get_line(false)?;

            // names starting with 0xFF were generated by the compiler
            let renamed = sym
                .name
                .strip_prefix('\u{FF}')
                .map(|rest| format!("${rest}"));
            if let Some(renamed) = renamed {
                sym.name = renamed;
                sym.generated = true;
            }
        }

        let vary = buf.get_u32()?;
        let properties = buf.get_u32()?;

        sym.count = properties & 0xFFF; // 12 bits
        let raw_type = (properties >> 12) & 0xF; // 4 bits
        sym.ty = Datatype::try_from(raw_type).map_err(|_| ScriptError::InvalidDatatype(raw_type))?;
        sym.flags = SymbolFlags::from_bits_truncate((properties >> 16) & 0x3F); // 6 bits

        if sym.is_member() {
            sym.member_offset = vary as i32;
        } else if sym.ty == Datatype::Class {
            sym.class_size = vary as i32;
        } else if sym.ty == Datatype::Function {
            sym.return_type =
                Datatype::try_from(vary & 0xF).map_err(|_| ScriptError::InvalidDatatype(vary))?;
        }

        sym.file_index = buf.get_u32()? & 0x7FFFF; // 19 bits
        sym.line_start = buf.get_u32()? & 0x7FFFF;
        sym.line_count = buf.get_u32()? & 0x7FFFF;
        sym.char_start = buf.get_u32()? & 0xFFFFFF; // 24 bits
        sym.char_count = buf.get_u32()? & 0xFFFFFF;

        if !sym.is_member() {
            match sym.ty {
                Datatype::Float => {
                    let mut values = Vec::with_capacity(sym.count as usize);
                    for _ in 0..sym.count {
                        values.push(buf.get_f32()?);
                    }
                    sym.value = SymbolValue::Float(values);
                }
                Datatype::Int => {
                    let mut values = Vec::with_capacity(sym.count as usize);
                    for _ in 0..sym.count {
                        values.push(buf.get_i32()?);
                    }
                    sym.value = SymbolValue::Int(values);
                }
                Datatype::String => {
                    let mut values = Vec::with_capacity(sym.count as usize);
                    for _ in 0..sym.count {
                        values.push(buf.get_line_escaped(false)?);
                    }
                    sym.value = SymbolValue::String(values);
                }
                Datatype::Class => {
                    sym.class_offset = buf.get_i32()?;
                }
                Datatype::Instance => {
                    sym.value = SymbolValue::Instance(None);
                    sym.address = buf.get_i32()? as u32;
                }
                Datatype::Function | Datatype::Prototype => {
                    sym.address = buf.get_i32()? as u32;
                }
                _ => {}
            }
        }

        sym.parent = buf.get_i32()?;
        Ok(sym)
    }

    /// The synthetic slot appended after loading which backs temporary
    /// string pushes in the VM.
    pub(crate) fn temporary_strings(index: u32) -> Symbol {
        Symbol {
            name: "$PHOENIX_FAKE_STRINGS".to_string(),
            ty: Datatype::String,
            count: 1,
            generated: true,
            index,
            parent: -1,
            value: SymbolValue::String(vec![String::new()]),
            ..Symbol::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> Datatype {
        self.ty
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn flags(&self) -> SymbolFlags {
        self.flags
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn is_const(&self) -> bool {
        self.flags.contains(SymbolFlags::CONST)
    }

    pub fn is_member(&self) -> bool {
        self.flags.contains(SymbolFlags::MEMBER)
    }

    pub fn is_external(&self) -> bool {
        self.flags.contains(SymbolFlags::EXTERNAL)
    }

    pub fn is_merged(&self) -> bool {
        self.flags.contains(SymbolFlags::MERGED)
    }

    pub fn has_return(&self) -> bool {
        self.flags.contains(SymbolFlags::RETURN)
    }

    pub fn return_type(&self) -> Datatype {
        self.return_type
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    pub fn parent(&self) -> i32 {
        self.parent
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn member_offset(&self) -> i32 {
        self.member_offset
    }

    pub fn class_size(&self) -> i32 {
        self.class_size
    }

    pub fn class_offset(&self) -> i32 {
        self.class_offset
    }

    fn check_access(
        &self,
        expected: Datatype,
        index: u16,
        context: Option<&InstancePtr>,
    ) -> Result<(), VmError> {
        let function_as_int = expected == Datatype::Int && self.ty == Datatype::Function;
        if self.ty != expected && !function_as_int {
            return Err(VmError::IllegalTypeAccess {
                symbol: self.name.clone(),
                expected,
                actual: self.ty,
            });
        }

        // function symbols read as ints always expose their address
        let limit = if function_as_int {
            self.count.max(1)
        } else {
            self.count
        };
        if index as u32 >= limit {
            return Err(VmError::IllegalIndexAccess {
                symbol: self.name.clone(),
                index,
            });
        }

        if self.is_member() {
            if self.parent < 0 {
                return Err(VmError::UnboundMemberAccess {
                    symbol: self.name.clone(),
                });
            }

            let Some(context) = context else {
                return Err(VmError::NoContext {
                    symbol: self.name.clone(),
                });
            };

            let class = context.borrow().class_index;
            if class < 0 {
                return Err(VmError::IllegalInstanceAccess {
                    symbol: self.name.clone(),
                });
            }
            if class != self.parent {
                return Err(VmError::IllegalContextType {
                    symbol: self.name.clone(),
                    context_class: class.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn get_int(&self, index: u16, context: Option<&InstancePtr>) -> Result<i32, VmError> {
        self.check_access(Datatype::Int, index, context)?;

        if self.is_member() {
            let context = context.ok_or_else(|| VmError::NoContext {
                symbol: self.name.clone(),
            })?;
            return Ok(context.borrow().int(self.index, index as usize));
        }

        match &self.value {
            SymbolValue::Int(values) => Ok(values[index as usize]),
            // reading a function symbol as an int yields its address
            _ if self.ty == Datatype::Function => Ok(self.address as i32),
            _ => Ok(0),
        }
    }

    pub fn get_float(&self, index: u16, context: Option<&InstancePtr>) -> Result<f32, VmError> {
        self.check_access(Datatype::Float, index, context)?;

        if self.is_member() {
            let context = context.ok_or_else(|| VmError::NoContext {
                symbol: self.name.clone(),
            })?;
            return Ok(context.borrow().float(self.index, index as usize));
        }

        match &self.value {
            SymbolValue::Float(values) => Ok(values[index as usize]),
            _ => Ok(0.0),
        }
    }

    pub fn get_string(&self, index: u16, context: Option<&InstancePtr>) -> Result<String, VmError> {
        self.check_access(Datatype::String, index, context)?;

        if self.is_member() {
            let context = context.ok_or_else(|| VmError::NoContext {
                symbol: self.name.clone(),
            })?;
            return Ok(context.borrow().string(self.index, index as usize));
        }

        match &self.value {
            SymbolValue::String(values) => Ok(values[index as usize].clone()),
            _ => Ok(String::new()),
        }
    }

    fn check_mutable(&self) -> Result<(), VmError> {
        if self.is_const() {
            return Err(VmError::IllegalConstAccess {
                symbol: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn set_int(
        &mut self,
        value: i32,
        index: u16,
        context: Option<&InstancePtr>,
    ) -> Result<(), VmError> {
        self.check_mutable()?;
        self.check_access(Datatype::Int, index, context)?;

        if self.is_member() {
            let context = context.ok_or_else(|| VmError::NoContext {
                symbol: self.name.clone(),
            })?;
            context
                .borrow_mut()
                .set_int(self.index, index as usize, value);
        } else if let SymbolValue::Int(values) = &mut self.value {
            values[index as usize] = value;
        }

        Ok(())
    }

    pub fn set_float(
        &mut self,
        value: f32,
        index: u16,
        context: Option<&InstancePtr>,
    ) -> Result<(), VmError> {
        self.check_mutable()?;
        self.check_access(Datatype::Float, index, context)?;

        if self.is_member() {
            let context = context.ok_or_else(|| VmError::NoContext {
                symbol: self.name.clone(),
            })?;
            context
                .borrow_mut()
                .set_float(self.index, index as usize, value);
        } else if let SymbolValue::Float(values) = &mut self.value {
            values[index as usize] = value;
        }

        Ok(())
    }

    pub fn set_string(
        &mut self,
        value: String,
        index: u16,
        context: Option<&InstancePtr>,
    ) -> Result<(), VmError> {
        self.check_mutable()?;
        self.check_access(Datatype::String, index, context)?;

        if self.is_member() {
            let context = context.ok_or_else(|| VmError::NoContext {
                symbol: self.name.clone(),
            })?;
            context
                .borrow_mut()
                .set_string(self.index, index as usize, value);
        } else if let SymbolValue::String(values) = &mut self.value {
            values[index as usize] = value;
        }

        Ok(())
    }

    pub fn get_instance(&self) -> Result<Option<InstancePtr>, VmError> {
        match &self.value {
            SymbolValue::Instance(instance) => Ok(instance.clone()),
            _ => Err(VmError::IllegalTypeAccess {
                symbol: self.name.clone(),
                expected: Datatype::Instance,
                actual: self.ty,
            }),
        }
    }

    pub fn set_instance(&mut self, instance: Option<InstancePtr>) -> Result<(), VmError> {
        match &mut self.value {
            SymbolValue::Instance(slot) => {
                *slot = instance;
                Ok(())
            }
            _ => Err(VmError::IllegalTypeAccess {
                symbol: self.name.clone(),
                expected: Datatype::Instance,
                actual: self.ty,
            }),
        }
    }

    /// Grows the backing storage of the temporary-strings symbol so the
    /// next dynamic slot exists.
    pub(crate) fn ensure_string_slot(&mut self, index: u32) {
        if let SymbolValue::String(values) = &mut self.value {
            if values.len() <= index as usize {
                values.resize(index as usize + 1, String::new());
            }
            self.count = self.count.max(index + 1);
        }
    }
}
