// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Reading and writing module files

use ionad_core::{
    AssemblyReference, AttributeArgument, CustomAttribute, ExceptionHandler, HandlerKind, Instruction, MethodBody, MethodDef, MethodSignature, Module,
    ModuleError, OpCode, Operand, PropertyDef, TypeDef, TypeRef, read_module, write_module,
};

fn sample_module() -> Module {
    let util = TypeRef::new("Acme", "Util");
    let format = MethodDef::new_static("Format", MethodSignature::new("System.String", vec!["System.Int32".into()]));
    let call = Instruction::call(format.reference(util.clone()));

    let body = MethodBody::new(vec![
        Instruction::new(OpCode::LdcI4S, Operand::Int8(42)),
        call,
        Instruction::simple(OpCode::Pop),
        Instruction::branch(OpCode::LeaveS, 5),
        Instruction::simple(OpCode::Endfinally),
        Instruction::simple(OpCode::Ret),
    ])
    .with_locals(vec!["System.String".into()])
    .with_handler(ExceptionHandler {
        kind: HandlerKind::Finally,
        try_start: 0,
        try_end: 4,
        handler_start: 4,
        handler_end: 5,
    });

    let mut module = Module::new("Acme.App");
    module.add_type(TypeDef::new("Acme", "Util").with_method(format.with_body(MethodBody::new(vec![Instruction::ldstr("x"), Instruction::simple(OpCode::Ret)]))));
    module.add_type(
        TypeDef::new("Acme", "FakeUtil")
            .with_attribute(CustomAttribute::new(
                TypeRef::external("Ionad", "Ionad", "StaticReplacementAttribute"),
                vec![AttributeArgument::Type(util)],
            ))
            .with_property(PropertyDef::new("Count").with_getter(MethodDef::new_static("get_Count", MethodSignature::new("System.Int32", vec![])))),
    );
    module.add_type(TypeDef::new("Acme", "Program").with_method(MethodDef::new_static("Main", MethodSignature::void()).with_body(body)));
    module.add_reference(AssemblyReference::new("mscorlib", "4.0.0.0"));
    module.add_reference(AssemblyReference::new("Ionad", "1.0.0.0"));
    module
}

#[test]
fn test_json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");
    let module = sample_module();

    write_module(&path, &module).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"StaticReplacementAttribute\""));

    let loaded = read_module(&path).unwrap();
    assert_eq!(loaded, module);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_binary_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ionmod");
    let module = sample_module();

    write_module(&path, &module).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..5], b"IONMD");

    assert_eq!(read_module(&path).unwrap(), module);
}

#[test]
fn test_reading_garbage_fails_with_header_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ionmod");
    std::fs::write(&path, b"not a module at all").unwrap();
    assert!(matches!(read_module(&path), Err(ModuleError::InvalidHeader(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(read_module(&dir.path().join("missing.json")), Err(ModuleError::Io(_))));
}
