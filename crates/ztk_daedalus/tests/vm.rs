use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use ztk_daedalus::{Datatype, Opcode, Script, SymbolFlags, Vm, VmError};
use ztk_io::{Buffer, WriteExt};

const FLAG_CONST: u32 = 1 << 0;
const FLAG_RETURN: u32 = 1 << 1;
const FLAG_MEMBER: u32 = 1 << 2;
const FLAG_EXTERNAL: u32 = 1 << 3;

enum Payload {
    None,
    Address(i32),
    Ints(Vec<i32>),
    Strings(Vec<&'static str>),
    ClassOffset(i32),
}

struct SymbolSpec {
    name: &'static str,
    ty: u32,
    count: u32,
    flags: u32,
    vary: u32,
    payload: Payload,
    parent: i32,
}

fn write_symbol(out: &mut Vec<u8>, spec: &SymbolSpec) {
    out.put_u32(1).unwrap(); // named
    out.put_string(spec.name).unwrap();
    out.put_u8(b'\n').unwrap();

    out.put_u32(spec.vary).unwrap();
    out.put_u32(spec.count | (spec.ty << 12) | (spec.flags << 16))
        .unwrap();

    for _ in 0..5 {
        out.put_u32(0).unwrap(); // file/line/char spans
    }

    match &spec.payload {
        Payload::None => {}
        Payload::Address(address) => out.put_i32(*address).unwrap(),
        Payload::ClassOffset(offset) => out.put_i32(*offset).unwrap(),
        Payload::Ints(values) => {
            for v in values {
                out.put_i32(*v).unwrap();
            }
        }
        Payload::Strings(values) => {
            for v in values {
                out.put_string(v).unwrap();
                out.put_u8(b'\n').unwrap();
            }
        }
    }

    out.put_i32(spec.parent).unwrap();
}

fn op(code: &mut Vec<u8>, opcode: Opcode) {
    code.put_u8(opcode as u8).unwrap();
}

fn op_arg(code: &mut Vec<u8>, opcode: Opcode, argument: u32) {
    code.put_u8(opcode as u8).unwrap();
    code.put_u32(argument).unwrap();
}

/// Assembles the test image:
///
/// ```text
/// class C_TEST { var int value; };        // symbols 0, 1
/// instance TESTINST(C_TEST) { value = 42; };  // symbol 2, code @ 77
/// var int glob;                           // symbol 3
/// const string greeting = "HELLO WORLD";  // symbol 4
/// func int testfunc() { ... };            // symbol 5, code @ 0
/// external void ext_print(var string s);  // symbols 6, 7
/// func void caller() { ... };             // symbol 8, code @ 55
/// external int ext_rand();                // symbol 9
/// func void caller2() { testfunc(); };    // symbol 10, code @ 94
/// ```
fn build_dat() -> Vec<u8> {
    let symbols = [
        SymbolSpec {
            name: "C_TEST",
            ty: 4,
            count: 1,
            flags: 0,
            vary: 4, // class size
            payload: Payload::ClassOffset(0),
            parent: -1,
        },
        SymbolSpec {
            name: "C_TEST.VALUE",
            ty: 2,
            count: 1,
            flags: FLAG_MEMBER,
            vary: 0, // member offset
            payload: Payload::None,
            parent: 0,
        },
        SymbolSpec {
            name: "TESTINST",
            ty: 7,
            count: 0,
            flags: FLAG_CONST,
            vary: 0,
            payload: Payload::Address(77),
            parent: 0,
        },
        SymbolSpec {
            name: "GLOB",
            ty: 2,
            count: 1,
            flags: 0,
            vary: 0,
            payload: Payload::Ints(vec![0]),
            parent: -1,
        },
        SymbolSpec {
            name: "GREETING",
            ty: 3,
            count: 1,
            flags: FLAG_CONST,
            vary: 0,
            payload: Payload::Strings(vec!["HELLO WORLD"]),
            parent: -1,
        },
        SymbolSpec {
            name: "TESTFUNC",
            ty: 5,
            count: 0,
            flags: FLAG_CONST | FLAG_RETURN,
            vary: 2, // returns int
            payload: Payload::Address(0),
            parent: -1,
        },
        SymbolSpec {
            name: "EXT_PRINT",
            ty: 5,
            count: 1,
            flags: FLAG_CONST | FLAG_EXTERNAL,
            vary: 0,
            payload: Payload::Address(0),
            parent: -1,
        },
        SymbolSpec {
            name: "EXT_PRINT.PAR0",
            ty: 3,
            count: 1,
            flags: 0,
            vary: 0,
            payload: Payload::Strings(vec![""]),
            parent: -1,
        },
        SymbolSpec {
            name: "CALLER",
            ty: 5,
            count: 0,
            flags: FLAG_CONST,
            vary: 0,
            payload: Payload::Address(55),
            parent: -1,
        },
        SymbolSpec {
            name: "EXT_RAND",
            ty: 5,
            count: 0,
            flags: FLAG_CONST | FLAG_EXTERNAL | FLAG_RETURN,
            vary: 2,
            payload: Payload::Address(0),
            parent: -1,
        },
        SymbolSpec {
            name: "CALLER2",
            ty: 5,
            count: 0,
            flags: FLAG_CONST,
            vary: 0,
            payload: Payload::Address(94),
            parent: -1,
        },
    ];

    let mut code = Vec::new();

    // TESTFUNC @ 0
    op_arg(&mut code, Opcode::PushInt, 4); // 0
    op_arg(&mut code, Opcode::PushInt, 10); // 5
    op(&mut code, Opcode::Subtract); // 10: 10 - 4
    op_arg(&mut code, Opcode::PushVar, 3); // 11
    op(&mut code, Opcode::AssignInt); // 16: glob = 6
    op_arg(&mut code, Opcode::PushInt, 0); // 17
    op_arg(&mut code, Opcode::JumpIfZero, 38); // 22: taken
    op_arg(&mut code, Opcode::PushInt, 99); // 27: dead
    op_arg(&mut code, Opcode::PushVar, 3); // 32
    op(&mut code, Opcode::AssignInt); // 37
    op_arg(&mut code, Opcode::Jump, 49); // 38
    op_arg(&mut code, Opcode::PushInt, 111); // 43: dead
    op(&mut code, Opcode::Noop); // 48
    op_arg(&mut code, Opcode::PushInt, 7); // 49
    op(&mut code, Opcode::Return); // 54

    // CALLER @ 55
    assert_eq!(code.len(), 55);
    op_arg(&mut code, Opcode::PushVar, 4); // 55
    op_arg(&mut code, Opcode::CallExternal, 6); // 60: ext_print(greeting)
    op_arg(&mut code, Opcode::CallExternal, 9); // 65: ext_rand()
    op_arg(&mut code, Opcode::PushVar, 3); // 70
    op(&mut code, Opcode::AssignInt); // 75: glob = ext_rand()
    op(&mut code, Opcode::Return); // 76

    // TESTINST initializer @ 77
    assert_eq!(code.len(), 77);
    op_arg(&mut code, Opcode::SetInstance, 2); // 77
    op_arg(&mut code, Opcode::PushInt, 42); // 82
    op_arg(&mut code, Opcode::PushVar, 1); // 87
    op(&mut code, Opcode::AssignInt); // 92: value = 42
    op(&mut code, Opcode::Return); // 93

    // CALLER2 @ 94
    assert_eq!(code.len(), 94);
    op_arg(&mut code, Opcode::Call, 0); // 94: testfunc()
    op(&mut code, Opcode::Return); // 99
    assert_eq!(code.len(), 100);

    let mut raw = Vec::new();
    raw.put_u8(0x32).unwrap(); // version
    raw.put_u32(symbols.len() as u32).unwrap();
    for _ in 0..symbols.len() {
        raw.put_u32(0).unwrap(); // sort table, rebuilt on load
    }
    for spec in &symbols {
        write_symbol(&mut raw, spec);
    }
    raw.put_u32(code.len() as u32).unwrap();
    raw.extend_from_slice(&code);
    raw
}

fn load() -> Script {
    Script::parse(&mut Buffer::from_vec(build_dat())).unwrap()
}

#[test]
fn symbol_table_builds_all_three_indices() {
    let script = load();

    // the synthetic temporary-strings slot is appended on load
    assert_eq!(script.symbols().len(), 12);
    let temporary = script.find_symbol_by_name("$PHOENIX_FAKE_STRINGS").unwrap();
    assert!(temporary.is_generated());
    assert_eq!(temporary.datatype(), Datatype::String);

    // name lookups are case-insensitive
    let func = script.find_symbol_by_name("testfunc").unwrap();
    assert_eq!(func.index(), 5);
    assert_eq!(func.datatype(), Datatype::Function);
    assert!(func.has_return());
    assert_eq!(func.return_type(), Datatype::Int);

    let member = script.find_symbol_by_name("c_test.value").unwrap();
    assert!(member.is_member());
    assert_eq!(member.parent(), 0);

    let class = script.find_symbol_by_index(0).unwrap();
    assert_eq!(class.datatype(), Datatype::Class);
    assert_eq!(class.class_size(), 4);

    let instance = script.find_symbol_by_name("TESTINST").unwrap();
    assert_eq!(instance.address(), 77);
    assert_eq!(script.find_symbol_by_address(77).unwrap().index(), 2);

    let external = script.find_symbol_by_name("EXT_PRINT").unwrap();
    assert!(external.is_external());
    assert!(external.is_const());
    assert_eq!(external.flags(), SymbolFlags::CONST | SymbolFlags::EXTERNAL);

    assert!(script.find_symbol_by_name("NONEXISTENT").is_none());
    assert!(script.find_symbol_by_index(100).is_none());
}

#[test]
fn generated_names_are_rewritten() {
    let mut raw = Vec::new();
    raw.put_u8(0x32).unwrap();
    raw.put_u32(1).unwrap(); // one symbol
    raw.put_u32(0).unwrap(); // sort table

    raw.put_u32(1).unwrap(); // named
    raw.put_u8(0xFF).unwrap(); // compiler-generated marker byte
    raw.put_string("10000\n").unwrap();
    raw.put_u32(0).unwrap(); // vary
    raw.put_u32((2 << 12) | 1).unwrap(); // int, count 1
    for _ in 0..5 {
        raw.put_u32(0).unwrap();
    }
    raw.put_i32(0).unwrap(); // value
    raw.put_i32(-1).unwrap(); // parent
    raw.put_u32(0).unwrap(); // empty code segment

    let script = Script::parse(&mut Buffer::from_vec(raw)).unwrap();
    let symbol = script.find_symbol_by_index(0).unwrap();
    assert_eq!(symbol.name(), "$10000");
    assert!(symbol.is_generated());
    assert!(script.find_symbol_by_name("$10000").is_some());
}

#[test]
fn decoded_instruction_sizes_match_consumed_bytes() {
    let script = load();

    let expected = [
        (0u32, Opcode::PushInt, 5u32),
        (5, Opcode::PushInt, 5),
        (10, Opcode::Subtract, 1),
        (11, Opcode::PushVar, 5),
        (16, Opcode::AssignInt, 1),
        (17, Opcode::PushInt, 5),
        (22, Opcode::JumpIfZero, 5),
    ];

    let mut address = 0;
    for (at, opcode, size) in expected {
        assert_eq!(address, at);
        let instr = script.instruction_at(address).unwrap();
        assert_eq!(instr.op, opcode);
        assert_eq!(instr.size, size);
        address += instr.size;
    }
}

#[test]
fn parameters_follow_their_function() {
    let script = load();
    let external = script.find_symbol_by_name("EXT_PRINT").unwrap();
    let params = script.find_parameters_for_function(external);

    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name(), "EXT_PRINT.PAR0");
    assert_eq!(params[0].datatype(), Datatype::String);
}

#[test]
fn arithmetic_branches_and_assignment() {
    let mut vm = Vm::new(load());
    vm.call_function("TESTFUNC").unwrap();

    // the dead branches were skipped, the return value remains
    assert_eq!(vm.pop_int().unwrap(), 7);
    let glob = vm.script().find_symbol_by_name("GLOB").unwrap();
    assert_eq!(glob.get_int(0, None).unwrap(), 6);
}

#[test]
fn externals_pop_in_reverse_declaration_order() {
    let mut vm = Vm::new(load());

    let printed: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&printed);
    vm.register_external("EXT_PRINT", move |text: String| {
        sink.borrow_mut().push(text);
    })
    .unwrap();
    vm.register_external("EXT_RAND", || 1234i32).unwrap();

    vm.call_function("CALLER").unwrap();

    assert_eq!(*printed.borrow(), vec!["HELLO WORLD".to_string()]);
    let glob = vm.script().find_symbol_by_name("GLOB").unwrap();
    assert_eq!(glob.get_int(0, None).unwrap(), 1234);
}

#[test]
fn external_registration_is_type_checked() {
    let mut vm = Vm::new(load());

    match vm.register_external("EXT_PRINT", |_wrong: i32| {}) {
        Err(VmError::IllegalExternalParam { symbol, .. }) => assert_eq!(symbol, "EXT_PRINT"),
        other => panic!("expected a parameter error, got {other:?}"),
    }

    match vm.register_external("EXT_RAND", || "nope".to_string()) {
        Err(VmError::IllegalExternalRtype { symbol, provided }) => {
            assert_eq!(symbol, "EXT_RAND");
            assert_eq!(provided, Datatype::String);
        }
        other => panic!("expected a return type error, got {other:?}"),
    }

    match vm.register_external("TESTFUNC", || 0i32) {
        Err(VmError::NotAnExternal(symbol)) => assert_eq!(symbol, "TESTFUNC"),
        other => panic!("expected a non-external error, got {other:?}"),
    }
}

#[test]
fn default_external_cleans_up_the_stack() {
    let mut vm = Vm::new(load());

    let missing: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&missing);
    vm.register_default_external(move |name| {
        sink.borrow_mut().push(name.to_string());
    });

    vm.call_function("CALLER").unwrap();

    assert_eq!(
        *missing.borrow(),
        vec!["EXT_PRINT".to_string(), "EXT_RAND".to_string()]
    );
    // ext_rand's synthesized zero return landed in glob
    let glob = vm.script().find_symbol_by_name("GLOB").unwrap();
    assert_eq!(glob.get_int(0, None).unwrap(), 0);
}

#[test]
fn function_overrides_replace_script_code() {
    let mut vm = Vm::new(load());
    vm.override_function(0, |vm| {
        vm.push_int(4321);
        Ok(())
    });

    vm.call_function("CALLER2").unwrap();
    assert_eq!(vm.pop_int().unwrap(), 4321);

    // glob is untouched because the original body never ran
    let glob = vm.script().find_symbol_by_name("GLOB").unwrap();
    assert_eq!(glob.get_int(0, None).unwrap(), 0);
}

#[test]
fn instances_bind_member_storage() {
    let mut vm = Vm::new(load());
    let instance = vm.init_instance("TESTINST").unwrap();

    assert_eq!(instance.borrow().symbol_index, 2);
    assert_eq!(instance.borrow().class_index, 0);

    let member = vm.script().find_symbol_by_name("C_TEST.VALUE").unwrap();
    assert_eq!(member.get_int(0, Some(&instance)).unwrap(), 42);

    // guarded access
    match member.get_int(0, None) {
        Err(VmError::NoContext { symbol }) => assert_eq!(symbol, "C_TEST.VALUE"),
        other => panic!("expected a missing context error, got {other:?}"),
    }
}

#[test]
fn guarded_symbol_access() {
    let mut script = load();

    let glob = script.find_symbol_by_name("GLOB").unwrap();
    match glob.get_int(5, None) {
        Err(VmError::IllegalIndexAccess { index: 5, .. }) => {}
        other => panic!("expected an index error, got {other:?}"),
    }
    match glob.get_float(0, None) {
        Err(VmError::IllegalTypeAccess { expected, actual, .. }) => {
            assert_eq!(expected, Datatype::Float);
            assert_eq!(actual, Datatype::Int);
        }
        other => panic!("expected a type error, got {other:?}"),
    }

    let greeting = script.find_symbol_by_name_mut("GREETING").unwrap();
    assert_eq!(greeting.get_string(0, None).unwrap(), "HELLO WORLD");
    match greeting.set_string("other".into(), 0, None) {
        Err(VmError::IllegalConstAccess { symbol }) => assert_eq!(symbol, "GREETING"),
        other => panic!("expected a const error, got {other:?}"),
    }
}

#[test]
fn instances_enumerate_by_class() {
    let script = load();

    let mut found = Vec::new();
    script.enumerate_instances_by_class_name("C_TEST", |symbol| {
        found.push(symbol.name().to_string());
    });
    assert_eq!(found, vec!["TESTINST".to_string()]);

    let mut none = Vec::new();
    script.enumerate_instances_by_class_name("C_OTHER", |symbol| {
        none.push(symbol.name().to_string());
    });
    assert!(none.is_empty());
}

#[test]
fn temporary_strings_advance_per_push() {
    let mut vm = Vm::new(load());

    vm.push_string("first");
    vm.push_string("second");

    // most recent push pops first and dereferences its own slot
    assert_eq!(vm.pop_string().unwrap(), "second");
    assert_eq!(vm.pop_string().unwrap(), "first");
}
