use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::symbol::{Instance, InstancePtr};
use crate::{Datatype, Opcode, Result, Script, Symbol, VmError};

/// A single data-stack slot.
#[derive(Debug, Clone)]
enum StackValue {
    Int(i32),
    Float(f32),
    /// A symbol to dereference when the frame is read.
    Reference(u32),
    Instance(Option<InstancePtr>),
}

#[derive(Debug, Clone)]
struct StackFrame {
    value: StackValue,
    index: u16,
    context: Option<InstancePtr>,
}

#[derive(Debug, Clone)]
struct CallFrame {
    function: u32,
    program_counter: u32,
    context: Option<InstancePtr>,
    string_index: u32,
}

type Callback = Rc<dyn Fn(&mut Vm) -> Result<()>>;
type DefaultExternal = Rc<dyn Fn(&mut Vm, u32) -> Result<()>>;

/// The Daedalus virtual machine: a synchronous three-stack interpreter
/// over a loaded [`Script`].
pub struct Vm {
    script: Script,
    stack: Vec<StackFrame>,
    call_stack: Vec<CallFrame>,
    externals: HashMap<u32, Callback>,
    function_overrides: HashMap<u32, Callback>,
    default_external: Option<DefaultExternal>,
    instance: Option<InstancePtr>,
    self_index: Option<u32>,
    temporary_strings: u32,
    dynamic_string_index: u32,
    pc: u32,
}

impl Vm {
    pub fn new(script: Script) -> Vm {
        let self_index = script.find_symbol_by_name("SELF").map(Symbol::index);
        let temporary_strings = script
            .find_symbol_by_name("$PHOENIX_FAKE_STRINGS")
            .map(Symbol::index)
            .unwrap_or_default();

        Vm {
            script,
            stack: Vec::new(),
            call_stack: Vec::new(),
            externals: HashMap::new(),
            function_overrides: HashMap::new(),
            default_external: None,
            instance: None,
            self_index,
            temporary_strings,
            dynamic_string_index: 0,
            pc: 0,
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn script_mut(&mut self) -> &mut Script {
        &mut self.script
    }

    /// The instance last activated with `SetInstance`.
    pub fn instance(&self) -> Option<&InstancePtr> {
        self.instance.as_ref()
    }

    /// Calls the function called `name`. Arguments must have been
    /// pushed beforehand; the return value (if any) is left on the data
    /// stack.
    pub fn call_function(&mut self, name: &str) -> Result<()> {
        let symbol = self
            .script
            .find_symbol_by_name(name)
            .ok_or_else(|| VmError::SymbolNotFound(name.to_string()))?;
        let index = symbol.index();

        self.call(index).inspect_err(|err| {
            log::error!("error while executing script: {err}");
            log::error!("{}", self.stack_trace());
        })
    }

    /// Creates an instance object from the instance symbol `name`, binds
    /// it as `self` and runs the instance initializer.
    pub fn init_instance(&mut self, name: &str) -> Result<InstancePtr> {
        let symbol = self
            .script
            .find_symbol_by_name(name)
            .ok_or_else(|| VmError::SymbolNotFound(name.to_string()))?;

        if symbol.datatype() != Datatype::Instance {
            return Err(VmError::IllegalTypeAccess {
                symbol: symbol.name().to_string(),
                expected: Datatype::Instance,
                actual: symbol.datatype(),
            });
        }

        let index = symbol.index();
        let class_index = self.resolve_class_index(symbol.parent());
        let instance = Instance::new(index, class_index);

        self.symbol_mut(index)?
            .set_instance(Some(instance.clone()))?;

        if let Some(self_index) = self.self_index {
            self.symbol_mut(self_index)?
                .set_instance(Some(instance.clone()))?;
        }

        self.instance = Some(instance.clone());
        self.call(index)?;

        Ok(instance)
    }

    /// Follows the parent chain through prototypes to the class symbol.
    fn resolve_class_index(&self, mut parent: i32) -> i32 {
        while parent >= 0 {
            let Some(symbol) = self.script.find_symbol_by_index(parent as u32) else {
                return -1;
            };
            if symbol.datatype() == Datatype::Class {
                return parent;
            }
            parent = symbol.parent();
        }
        -1
    }

    /// Replaces the script function at `address` with a host callback.
    pub fn override_function(
        &mut self,
        address: u32,
        callback: impl Fn(&mut Vm) -> Result<()> + 'static,
    ) {
        self.function_overrides.insert(address, Rc::new(callback));
    }

    /// Installs the handler invoked when an unregistered external is
    /// called. The VM cleans the stack up first (declared parameters are
    /// popped, a zero value of the declared return type is pushed), then
    /// hands the external's name to the callback.
    pub fn register_default_external(&mut self, callback: impl Fn(&str) + 'static) {
        self.default_external = Some(Rc::new(move |vm, symbol_index| {
            let Some(symbol) = vm.script.find_symbol_by_index(symbol_index) else {
                return Err(VmError::UnresolvedFunction(symbol_index));
            };

            let name = symbol.name().to_string();
            let parameters: Vec<Datatype> = vm
                .script
                .find_parameters_for_function(symbol)
                .iter()
                .map(|p| p.datatype())
                .collect();
            let return_type = symbol.has_return().then(|| symbol.return_type());

            // last parameter is on top of the stack
            for _ in parameters.iter().rev() {
                vm.stack.pop();
            }

            match return_type {
                Some(Datatype::Float) => vm.push_float(0.0),
                Some(Datatype::Int) => vm.push_int(0),
                Some(Datatype::String) => vm.push_string(""),
                // instance returns cannot be synthesized: the compiled
                // script does not store the instance type
                _ => {}
            }

            callback(&name);
            Ok(())
        }));
    }

    /// Registers a typed external. The parameter and return types of
    /// the closure are validated against the symbol's declaration.
    pub fn register_external<P, R, F>(&mut self, name: &str, callback: F) -> Result<()>
    where
        F: ExternalFn<P, R> + 'static,
    {
        let symbol = self
            .script
            .find_symbol_by_name(name)
            .ok_or_else(|| VmError::SymbolNotFound(name.to_string()))?;

        if !symbol.is_external() {
            return Err(VmError::NotAnExternal(symbol.name().to_string()));
        }

        let declared_return = if symbol.has_return() {
            symbol.return_type()
        } else {
            Datatype::Void
        };
        if F::return_type() != declared_return {
            return Err(VmError::IllegalExternalRtype {
                symbol: symbol.name().to_string(),
                provided: F::return_type(),
            });
        }

        let declared: Vec<Datatype> = self
            .script
            .find_parameters_for_function(symbol)
            .iter()
            .map(|p| p.datatype())
            .collect();
        let provided = F::parameter_types();

        for (i, provided_type) in provided.iter().enumerate() {
            if declared.get(i) != Some(provided_type) {
                return Err(VmError::IllegalExternalParam {
                    symbol: symbol.name().to_string(),
                    provided: *provided_type,
                    index: i as u8,
                });
            }
        }

        if declared.len() != provided.len() {
            return Err(VmError::IllegalExternalParam {
                symbol: symbol.name().to_string(),
                provided: Datatype::Void,
                index: provided.len() as u8,
            });
        }

        let index = symbol.index();
        self.externals
            .insert(index, Rc::new(move |vm| callback.invoke(vm)));
        Ok(())
    }

    fn call(&mut self, symbol_index: u32) -> Result<()> {
        let address = self
            .script
            .find_symbol_by_index(symbol_index)
            .ok_or(VmError::UnresolvedFunction(symbol_index))?
            .address();

        self.push_call(symbol_index);
        self.jump(address)?;

        while self.exec()? {}

        self.pop_call();
        Ok(())
    }

    /// Executes the instruction at the program counter. Returns `false`
    /// once the current function returns.
    fn exec(&mut self) -> Result<bool> {
        let instr = self.script.instruction_at(self.pc)?;

        match instr.op {
            Opcode::Add => {
                let value = self.pop_int()?.wrapping_add(self.pop_int()?);
                self.push_int(value);
            }
            Opcode::Subtract => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int(a.wrapping_sub(b));
            }
            Opcode::Multiply => {
                let value = self.pop_int()?.wrapping_mul(self.pop_int()?);
                self.push_int(value);
            }
            Opcode::Divide => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                if b == 0 {
                    return Err(VmError::DivisionByZero);
                }
                self.push_int(a.wrapping_div(b));
            }
            Opcode::Modulo => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                if b == 0 {
                    return Err(VmError::DivisionByZero);
                }
                self.push_int(a.wrapping_rem(b));
            }
            Opcode::BitOr => {
                let value = self.pop_int()? | self.pop_int()?;
                self.push_int(value);
            }
            Opcode::BitAnd => {
                let value = self.pop_int()? & self.pop_int()?;
                self.push_int(value);
            }
            Opcode::Less => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int((a < b) as i32);
            }
            Opcode::Greater => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int((a > b) as i32);
            }
            Opcode::ShiftLeft => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int(a.wrapping_shl(b as u32));
            }
            Opcode::ShiftRight => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int(a.wrapping_shr(b as u32));
            }
            Opcode::LessOrEqual => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int((a <= b) as i32);
            }
            Opcode::Equal => {
                let value = (self.pop_int()? == self.pop_int()?) as i32;
                self.push_int(value);
            }
            Opcode::NotEqual => {
                let value = (self.pop_int()? != self.pop_int()?) as i32;
                self.push_int(value);
            }
            Opcode::GreaterOrEqual => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int((a >= b) as i32);
            }
            Opcode::Or => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int((a != 0 || b != 0) as i32);
            }
            Opcode::And => {
                let a = self.pop_int()?;
                let b = self.pop_int()?;
                self.push_int((a != 0 && b != 0) as i32);
            }
            Opcode::Plus => {
                let value = self.pop_int()?;
                self.push_int(value);
            }
            Opcode::Minus => {
                let value = self.pop_int()?.wrapping_neg();
                self.push_int(value);
            }
            Opcode::Not => {
                let value = (self.pop_int()? == 0) as i32;
                self.push_int(value);
            }
            Opcode::Complement => {
                let value = !self.pop_int()?;
                self.push_int(value);
            }
            Opcode::Noop => {}
            Opcode::Return => return Ok(false),
            Opcode::Call => {
                if let Some(callback) = self.function_overrides.get(&instr.address).cloned() {
                    let frame = self
                        .script
                        .find_symbol_by_address(instr.address)
                        .map(Symbol::index);

                    if let Some(frame) = frame {
                        self.push_call(frame);
                        callback(self)?;
                        self.pop_call();
                    } else {
                        callback(self)?;
                    }
                } else {
                    let symbol = self
                        .script
                        .find_symbol_by_address(instr.address)
                        .ok_or(VmError::UnresolvedFunction(instr.address))?
                        .index();
                    self.call(symbol)?;
                }
            }
            Opcode::CallExternal => {
                let symbol = self
                    .script
                    .find_symbol_by_index(instr.symbol)
                    .ok_or(VmError::UnresolvedFunction(instr.symbol))?;
                let name = symbol.name().to_string();
                let index = symbol.index();

                match self.externals.get(&index).cloned() {
                    Some(callback) => {
                        self.push_call(index);
                        callback(self)?;
                        self.pop_call();
                    }
                    None => match self.default_external.clone() {
                        Some(handler) => handler(self, index)?,
                        None => return Err(VmError::UnresolvedExternal(name)),
                    },
                }
            }
            Opcode::PushInt => self.push_int(instr.immediate),
            Opcode::PushVar | Opcode::PushInstance => {
                if self.script.find_symbol_by_index(instr.symbol).is_none() {
                    return Err(VmError::UnresolvedFunction(instr.symbol));
                }
                self.push_reference(instr.symbol, 0);
            }
            Opcode::PushArrayVar => {
                if self.script.find_symbol_by_index(instr.symbol).is_none() {
                    return Err(VmError::UnresolvedFunction(instr.symbol));
                }
                self.push_reference(instr.symbol, instr.index as u16);
            }
            Opcode::AssignInt | Opcode::AssignFunc => {
                let (symbol, index, context) = self.pop_reference()?;
                let value = self.pop_int()?;
                self.symbol_mut(symbol)?
                    .set_int(value, index, context.as_ref())?;
            }
            Opcode::AssignFloat => {
                let (symbol, index, context) = self.pop_reference()?;
                let value = self.pop_float()?;
                self.symbol_mut(symbol)?
                    .set_float(value, index, context.as_ref())?;
            }
            Opcode::AssignString => {
                let (symbol, index, context) = self.pop_reference()?;
                let value = self.pop_string()?;
                self.symbol_mut(symbol)?
                    .set_string(value, index, context.as_ref())?;
            }
            Opcode::AssignStringRef => return Err(VmError::NotImplemented("AssignStringRef")),
            Opcode::AssignAdd | Opcode::AssignSubtract | Opcode::AssignMultiply
            | Opcode::AssignDivide => {
                let (symbol, index, context) = self.pop_reference()?;
                let current = self
                    .symbol(symbol)?
                    .get_int(index, context.as_ref())?;
                let operand = self.pop_int()?;
                let value = match instr.op {
                    Opcode::AssignAdd => current.wrapping_add(operand),
                    Opcode::AssignSubtract => current.wrapping_sub(operand),
                    Opcode::AssignMultiply => current.wrapping_mul(operand),
                    _ => {
                        if operand == 0 {
                            return Err(VmError::DivisionByZero);
                        }
                        current.wrapping_div(operand)
                    }
                };
                self.symbol_mut(symbol)?
                    .set_int(value, index, context.as_ref())?;
            }
            Opcode::AssignInstance => {
                let (symbol, _, _) = self.pop_reference()?;
                let value = self.pop_instance()?;
                self.symbol_mut(symbol)?.set_instance(value)?;
            }
            Opcode::Jump => {
                self.jump(instr.address)?;
                return Ok(true);
            }
            Opcode::JumpIfZero => {
                if self.pop_int()? == 0 {
                    self.jump(instr.address)?;
                    return Ok(true);
                }
            }
            Opcode::SetInstance => {
                self.instance = self.symbol(instr.symbol)?.get_instance()?;
            }
        }

        self.pc += instr.size;
        Ok(true)
    }

    fn symbol(&self, index: u32) -> Result<&Symbol> {
        self.script
            .find_symbol_by_index(index)
            .ok_or(VmError::UnresolvedFunction(index))
    }

    fn symbol_mut(&mut self, index: u32) -> Result<&mut Symbol> {
        self.script
            .find_symbol_by_index_mut(index)
            .ok_or(VmError::UnresolvedFunction(index))
    }

    fn jump(&mut self, address: u32) -> Result<()> {
        if address as usize > self.script.size() {
            return Err(VmError::IllegalJump(address));
        }
        self.pc = address;
        Ok(())
    }

    fn push_call(&mut self, symbol_index: u32) {
        self.call_stack.push(CallFrame {
            function: symbol_index,
            program_counter: self.pc,
            context: self.instance.clone(),
            string_index: self.dynamic_string_index,
        });
    }

    fn pop_call(&mut self) {
        let Some(frame) = self.call_stack.pop() else {
            return;
        };

        self.pc = frame.program_counter;
        self.instance = frame.context;

        // keep the slot alive if the function just returned a string in it
        let returns_string = self
            .script
            .find_symbol_by_index(frame.function)
            .is_some_and(|s| s.has_return() && s.return_type() == Datatype::String);
        if !returns_string {
            self.dynamic_string_index = frame.string_index;
        }
    }

    pub fn push_int(&mut self, value: i32) {
        self.stack.push(StackFrame {
            value: StackValue::Int(value),
            index: 0,
            context: None,
        });
    }

    pub fn push_float(&mut self, value: f32) {
        self.stack.push(StackFrame {
            value: StackValue::Float(value),
            index: 0,
            context: None,
        });
    }

    pub fn push_instance(&mut self, value: Option<InstancePtr>) {
        self.stack.push(StackFrame {
            value: StackValue::Instance(value),
            index: 0,
            context: None,
        });
    }

    pub fn push_reference(&mut self, symbol: u32, index: u16) {
        self.stack.push(StackFrame {
            value: StackValue::Reference(symbol),
            index,
            context: self.instance.clone(),
        });
    }

    /// Stores `value` into the next dynamic slot of the synthetic
    /// temporary-strings symbol and pushes a reference to it.
    pub fn push_string(&mut self, value: &str) {
        let slot = self.dynamic_string_index;
        let temporary = self.temporary_strings;

        if let Some(symbol) = self.script.find_symbol_by_index_mut(temporary) {
            symbol.ensure_string_slot(slot);
            let _ = symbol.set_string(value.to_string(), slot as u16, None);
        }

        self.push_reference(temporary, slot as u16);
        self.dynamic_string_index += 1;
    }

    pub fn pop_int(&mut self) -> Result<i32> {
        let Some(frame) = self.stack.pop() else {
            log::warn!("popping 0 from an empty stack");
            return Ok(0);
        };

        match frame.value {
            StackValue::Int(value) => Ok(value),
            StackValue::Reference(symbol) => self
                .symbol(symbol)?
                .get_int(frame.index, frame.context.as_ref()),
            _ => Err(VmError::UnexpectedStackFrame("int")),
        }
    }

    pub fn pop_float(&mut self) -> Result<f32> {
        let frame = self.stack.pop().ok_or(VmError::EmptyStack)?;

        match frame.value {
            StackValue::Float(value) => Ok(value),
            // ints re-interpret bitwise; the compiler stores float
            // immediates through PushInt
            StackValue::Int(value) => Ok(f32::from_bits(value as u32)),
            StackValue::Reference(symbol) => self
                .symbol(symbol)?
                .get_float(frame.index, frame.context.as_ref()),
            _ => Err(VmError::UnexpectedStackFrame("float")),
        }
    }

    pub fn pop_string(&mut self) -> Result<String> {
        let (symbol, index, context) = self.pop_reference()?;
        self.symbol(symbol)?.get_string(index, context.as_ref())
    }

    pub fn pop_instance(&mut self) -> Result<Option<InstancePtr>> {
        let frame = self.stack.pop().ok_or(VmError::EmptyStack)?;

        match frame.value {
            StackValue::Instance(value) => Ok(value),
            StackValue::Reference(symbol) => self.symbol(symbol)?.get_instance(),
            _ => Err(VmError::UnexpectedStackFrame("instance")),
        }
    }

    pub fn pop_reference(&mut self) -> Result<(u32, u16, Option<InstancePtr>)> {
        let frame = self.stack.pop().ok_or(VmError::EmptyStack)?;

        match frame.value {
            StackValue::Reference(symbol) => Ok((symbol, frame.index, frame.context)),
            _ => Err(VmError::UnexpectedStackFrame("reference")),
        }
    }

    /// Renders the call stack (most recent call first) and the data
    /// stack (most recent push first) for diagnostics.
    pub fn stack_trace(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "------- CALL STACK (MOST RECENT CALL FIRST) -------");
        let mut last_pc = self.pc;
        for frame in self.call_stack.iter().rev() {
            let name = self
                .script
                .find_symbol_by_index(frame.function)
                .map(Symbol::name)
                .unwrap_or("<unknown>");
            let _ = writeln!(out, "in {name} at 0x{last_pc:x}");
            last_pc = frame.program_counter;
        }

        let _ = writeln!(out, "------- STACK (MOST RECENT PUSH FIRST) -------");
        for (i, frame) in self.stack.iter().rev().enumerate() {
            match &frame.value {
                StackValue::Int(value) => {
                    let _ = writeln!(out, "{i}: [IMMEDIATE INT] = {value}");
                }
                StackValue::Float(value) => {
                    let _ = writeln!(out, "{i}: [IMMEDIATE FLOAT] = {value}");
                }
                StackValue::Instance(value) => {
                    let class = value
                        .as_ref()
                        .map(|inst| self.class_name_of(inst))
                        .unwrap_or_else(|| "NULL".to_string());
                    let _ = writeln!(out, "{i}: [IMMEDIATE INSTANCE] = {class}");
                }
                StackValue::Reference(symbol) => {
                    let rendered = self.render_reference(*symbol, frame);
                    let _ = writeln!(out, "{i}: [REFERENCE] {rendered}");
                }
            }
        }

        out
    }

    fn class_name_of(&self, instance: &InstancePtr) -> String {
        let class_index = instance.borrow().class_index;
        if class_index < 0 {
            return "<unregistered>".to_string();
        }
        self.script
            .find_symbol_by_index(class_index as u32)
            .map(|s| format!("<instance of {:?}>", s.name()))
            .unwrap_or_else(|| "<unregistered>".to_string())
    }

    fn render_reference(&self, symbol: u32, frame: &StackFrame) -> String {
        let Some(sym) = self.script.find_symbol_by_index(symbol) else {
            return format!("<invalid symbol {symbol}>");
        };

        let context = frame.context.as_ref();
        let value = match sym.datatype() {
            Datatype::Int | Datatype::Function => sym
                .get_int(frame.index, context)
                .map(|v| v.to_string())
                .unwrap_or_else(|e| format!("<{e}>")),
            Datatype::Float => sym
                .get_float(frame.index, context)
                .map(|v| v.to_string())
                .unwrap_or_else(|e| format!("<{e}>")),
            Datatype::String => sym
                .get_string(frame.index, context)
                .map(|v| format!("{v:?}"))
                .unwrap_or_else(|e| format!("<{e}>")),
            Datatype::Instance => match sym.get_instance() {
                Ok(Some(instance)) => self.class_name_of(&instance),
                Ok(None) => "NULL".to_string(),
                Err(e) => format!("<{e}>"),
            },
            _ => "<invalid stack frame>".to_string(),
        };

        format!("{}[{}] = {}", sym.name(), frame.index, value)
    }
}

/// A value the VM can pop as an external's parameter.
pub trait FromStack: Sized {
    const TYPE: Datatype;
    fn from_stack(vm: &mut Vm) -> Result<Self>;
}

impl FromStack for i32 {
    const TYPE: Datatype = Datatype::Int;
    fn from_stack(vm: &mut Vm) -> Result<Self> {
        vm.pop_int()
    }
}

impl FromStack for f32 {
    const TYPE: Datatype = Datatype::Float;
    fn from_stack(vm: &mut Vm) -> Result<Self> {
        vm.pop_float()
    }
}

impl FromStack for String {
    const TYPE: Datatype = Datatype::String;
    fn from_stack(vm: &mut Vm) -> Result<Self> {
        vm.pop_string()
    }
}

impl FromStack for Option<InstancePtr> {
    const TYPE: Datatype = Datatype::Instance;
    fn from_stack(vm: &mut Vm) -> Result<Self> {
        vm.pop_instance()
    }
}

/// A value the VM can push as an external's return.
pub trait IntoStack {
    const TYPE: Datatype;
    fn into_stack(self, vm: &mut Vm) -> Result<()>;
}

impl IntoStack for () {
    const TYPE: Datatype = Datatype::Void;
    fn into_stack(self, _vm: &mut Vm) -> Result<()> {
        Ok(())
    }
}

impl IntoStack for i32 {
    const TYPE: Datatype = Datatype::Int;
    fn into_stack(self, vm: &mut Vm) -> Result<()> {
        vm.push_int(self);
        Ok(())
    }
}

impl IntoStack for f32 {
    const TYPE: Datatype = Datatype::Float;
    fn into_stack(self, vm: &mut Vm) -> Result<()> {
        vm.push_float(self);
        Ok(())
    }
}

impl IntoStack for String {
    const TYPE: Datatype = Datatype::String;
    fn into_stack(self, vm: &mut Vm) -> Result<()> {
        vm.push_string(&self);
        Ok(())
    }
}

impl IntoStack for Option<InstancePtr> {
    const TYPE: Datatype = Datatype::Instance;
    fn into_stack(self, vm: &mut Vm) -> Result<()> {
        vm.push_instance(self);
        Ok(())
    }
}

/// Host closures registrable as externals, implemented for every arity
/// up to eight parameters.
pub trait ExternalFn<P, R> {
    fn return_type() -> Datatype;
    fn parameter_types() -> Vec<Datatype>;
    fn invoke(&self, vm: &mut Vm) -> Result<()>;
}

macro_rules! reverse_pop {
    ($vm:expr $(,)?) => {};
    ($vm:expr, $head:ident $(, $tail:ident)*) => {
        // the last declared parameter sits on top, so the tail pops first
        reverse_pop!($vm $(, $tail)*);
        let $head = <$head as FromStack>::from_stack($vm)?;
    };
}

macro_rules! impl_external_fn {
    ($($p:ident),*) => {
        impl<FN, R, $($p),*> ExternalFn<($($p,)*), R> for FN
        where
            FN: Fn($($p),*) -> R,
            R: IntoStack,
            $($p: FromStack),*
        {
            fn return_type() -> Datatype {
                R::TYPE
            }

            fn parameter_types() -> Vec<Datatype> {
                vec![$($p::TYPE),*]
            }

            #[allow(non_snake_case)]
            fn invoke(&self, vm: &mut Vm) -> Result<()> {
                reverse_pop!(vm $(, $p)*);
                (self)($($p),*).into_stack(vm)
            }
        }
    };
}

impl_external_fn!();
impl_external_fn!(A);
impl_external_fn!(A, B);
impl_external_fn!(A, B, C);
impl_external_fn!(A, B, C, D);
impl_external_fn!(A, B, C, D, E);
impl_external_fn!(A, B, C, D, E, F);
impl_external_fn!(A, B, C, D, E, F, G);
impl_external_fn!(A, B, C, D, E, F, G, H);
