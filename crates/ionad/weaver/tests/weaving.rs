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

//! End-to-end weaving scenarios

use ionad_core::{
    AssemblyReference, AttributeArgument, CustomAttribute, Instruction, MethodBody, MethodDef, MethodRef, MethodSignature, Module, OpCode, Operand,
    PropertyDef, TypeDef, TypeRef,
};
use ionad_weaver::{CollectingSink, Level, MethodMatching, ModuleWeaver, WeaveError, WeaverConfig, weave};

const ATTRIBUTE: &str = "Ionad.StaticReplacementAttribute";

fn replaces(source: &str) -> CustomAttribute {
    CustomAttribute::new(
        TypeRef::external("Ionad", "Ionad", "StaticReplacementAttribute"),
        vec![AttributeArgument::Type(TypeRef::new("App", source))],
    )
}

fn util_type() -> TypeDef {
    TypeDef::new("App", "Util")
        .with_method(MethodDef::new_static("Format", MethodSignature::void()).with_body(MethodBody::new(vec![Instruction::simple(OpCode::Ret)])))
        .with_method(MethodDef::new_instance("Describe", MethodSignature::new("System.String", vec![])))
}

fn util_method(name: &str) -> MethodRef {
    MethodRef::new(TypeRef::new("App", "Util"), name, false, MethodSignature::void())
}

fn program(instructions: Vec<Instruction>) -> TypeDef {
    TypeDef::new("App", "Program").with_method(MethodDef::new_static("Main", MethodSignature::void()).with_body(MethodBody::new(instructions)))
}

/// `Program.Main` calls `Util.Format()` once
fn scenario(fake: TypeDef) -> Module {
    let mut module = Module::new("App");
    module.add_type(util_type());
    module.add_type(fake.with_attribute(replaces("Util")));
    module.add_type(program(vec![Instruction::call(util_method("Format")), Instruction::simple(OpCode::Ret)]));
    module.add_reference(AssemblyReference::new("mscorlib", "4.0.0.0"));
    module.add_reference(AssemblyReference::new("Ionad", "1.0.0.0"));
    module
}

fn main_body(module: &Module) -> &MethodBody {
    let program = module.find_type("App.Program").unwrap();
    module.type_def(program).methods[0].body.as_ref().unwrap()
}

fn run(module: &mut Module, config: WeaverConfig) -> CollectingSink<'static> {
    let mut sink = CollectingSink::new();
    ModuleWeaver::new(config).execute(module, &mut sink).unwrap();
    sink
}

#[test]
fn test_call_redirected_to_replacement() {
    let fake_format = MethodDef::new_static("Format", MethodSignature::void());
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(fake_format.clone()));

    let sink = run(&mut module, WeaverConfig::default());

    let body = main_body(&module);
    assert_eq!(body.len(), 2);
    assert_eq!(body.instructions[0].operand, Operand::Method(fake_format.reference(TypeRef::new("App", "FakeUtil"))));
    assert_eq!(sink.error_count(), 0);

    let fake = module.find_type("App.FakeUtil").unwrap();
    assert_eq!(module.type_def(fake).attributes_of(ATTRIBUTE).count(), 0);
}

#[test]
fn test_missing_replacement_method_reports_once() {
    let mut module = scenario(TypeDef::new("App", "FakeUtil"));
    let main = module.find_type("App.Program").unwrap();
    module.type_def_mut(main).methods[0]
        .body
        .as_mut()
        .unwrap()
        .instructions
        .insert(1, Instruction::call(util_method("Format")));

    let sink = run(&mut module, WeaverConfig::default());

    let body = main_body(&module);
    assert_eq!(body.instructions[0].operand, Operand::Method(util_method("Format")));
    assert_eq!(body.instructions[1].operand, Operand::Method(util_method("Format")));
    assert_eq!(sink.messages(Level::Error), vec!["Missing 'App.Util.Format()' in 'App.FakeUtil'"]);
}

#[test]
fn test_library_reference_removed() {
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(MethodDef::new_static("Format", MethodSignature::void())));

    let sink = run(&mut module, WeaverConfig::default());

    assert!(module.find_reference("Ionad").is_none());
    assert!(module.find_reference("mscorlib").is_some());
    let removals: Vec<_> = sink.messages(Level::Info).into_iter().filter(|m| m.starts_with("Removing reference")).collect();
    assert_eq!(removals, vec!["Removing reference to 'Ionad.dll'."]);
}

#[test]
fn test_module_without_declarations_is_untouched() {
    let mut module = Module::new("App");
    module.add_type(util_type());
    module.add_type(program(vec![
        Instruction::new(OpCode::LdcI4S, Operand::Int8(9)),
        Instruction::simple(OpCode::Pop),
        Instruction::call(util_method("Format")),
        Instruction::simple(OpCode::Ret),
    ]));
    module.add_reference(AssemblyReference::new("Ionad", "1.0.0.0"));
    let before = main_body(&module).clone();

    let sink = run(&mut module, WeaverConfig::default());

    assert_eq!(main_body(&module), &before);
    assert!(!main_body(&module).init_locals);
    assert!(module.assembly_references.is_empty());
    assert_eq!(
        sink.messages(Level::Info),
        vec!["No static replacements found", "Removing reference to 'Ionad.dll'."]
    );
}

#[test]
fn test_instance_calls_are_left_alone() {
    let describe = MethodRef::new(TypeRef::new("App", "Util"), "Describe", true, MethodSignature::new("System.String", vec![]));
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(MethodDef::new_static("Describe", MethodSignature::new("System.String", vec![]))));
    let main = module.find_type("App.Program").unwrap();
    module.type_def_mut(main).methods[0].body = Some(MethodBody::new(vec![
        Instruction::simple(OpCode::Ldnull),
        Instruction::call(describe.clone()),
        Instruction::simple(OpCode::Pop),
        Instruction::simple(OpCode::Ret),
    ]));

    let sink = run(&mut module, WeaverConfig::default());

    assert_eq!(main_body(&module).instructions[1].operand, Operand::Method(describe));
    assert_eq!(sink.error_count(), 0);
}

#[test]
fn test_virtual_dispatch_is_left_alone() {
    let fake_format = MethodDef::new_static("Format", MethodSignature::void());
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(fake_format.clone()));
    let main = module.find_type("App.Program").unwrap();
    module.type_def_mut(main).methods[0].body = Some(MethodBody::new(vec![
        Instruction::callvirt(util_method("Format")),
        Instruction::call(util_method("Format")),
        Instruction::simple(OpCode::Ret),
    ]));

    let sink = run(&mut module, WeaverConfig::default());

    let body = main_body(&module);
    assert_eq!(body.instructions[0], Instruction::callvirt(util_method("Format")));
    assert_eq!(body.instructions[1].operand, Operand::Method(fake_format.reference(TypeRef::new("App", "FakeUtil"))));
    assert_eq!(sink.error_count(), 0);
}

#[test]
fn test_every_body_gets_initialized_locals() {
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(MethodDef::new_static("Format", MethodSignature::void())));

    run(&mut module, WeaverConfig::default());

    for slot in module.body_slots() {
        assert!(module.body(slot).unwrap().init_locals);
    }
}

#[test]
fn test_second_run_changes_nothing() {
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(MethodDef::new_static("Format", MethodSignature::void())));
    run(&mut module, WeaverConfig::default());
    let woven = module.clone();

    let sink = run(&mut module, WeaverConfig::default());

    assert_eq!(module, woven);
    assert_eq!(
        sink.messages(Level::Info),
        vec!["No static replacements found", "No reference to 'Ionad.dll' found. References not modified."]
    );
}

#[test]
fn test_accessor_bodies_are_rewritten() {
    let getter = MethodDef::new_static("get_Label", MethodSignature::new("System.String", vec![])).with_body(MethodBody::new(vec![
        Instruction::call(util_method("Format")),
        Instruction::ldstr("label"),
        Instruction::simple(OpCode::Ret),
    ]));
    let fake_format = MethodDef::new_static("Format", MethodSignature::void());
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(fake_format.clone()));
    module.add_type(TypeDef::new("App", "Settings").with_property(PropertyDef::new("Label").with_getter(getter)));

    run(&mut module, WeaverConfig::default());

    let settings = module.find_type("App.Settings").unwrap();
    let body = module.type_def(settings).properties[0].getter.as_ref().unwrap().body.as_ref().unwrap();
    assert_eq!(body.instructions[0].operand, Operand::Method(fake_format.reference(TypeRef::new("App", "FakeUtil"))));
    assert!(body.init_locals);
}

#[test]
fn test_branches_survive_rewriting() {
    let mut module = scenario(TypeDef::new("App", "FakeUtil").with_method(MethodDef::new_static("Format", MethodSignature::void())));
    let main = module.find_type("App.Program").unwrap();
    module.type_def_mut(main).methods[0].body = Some(MethodBody::new(vec![
        Instruction::simple(OpCode::Ldarg0),
        Instruction::branch(OpCode::BrfalseS, 3),
        Instruction::call(util_method("Format")),
        Instruction::simple(OpCode::Ret),
    ]));

    run(&mut module, WeaverConfig::default());

    let body = main_body(&module);
    assert_eq!(body.instructions[0].opcode, OpCode::Ldarg0);
    assert_eq!(body.instructions[1].opcode, OpCode::BrfalseS);
    assert_eq!(body.instructions[1].operand, Operand::Target(3));
    assert!(body.validate().is_ok());
}

#[test]
fn test_exact_signature_refuses_mismatch() {
    let fake = TypeDef::new("App", "FakeUtil").with_method(MethodDef::new_static("Format", MethodSignature::new("System.Void", vec!["System.Int32".into()])));

    let mut loose = scenario(fake.clone());
    let sink = run(&mut loose, WeaverConfig::default());
    assert_eq!(sink.error_count(), 0);
    assert_ne!(main_body(&loose).instructions[0].operand, Operand::Method(util_method("Format")));

    let mut strict = scenario(fake);
    let sink = run(&mut strict, WeaverConfig::default().with_method_matching(MethodMatching::ExactSignature));
    assert_eq!(sink.error_count(), 1);
    assert_eq!(main_body(&strict).instructions[0].operand, Operand::Method(util_method("Format")));
}

#[test]
fn test_unresolved_call_aborts() {
    let mut module = scenario(TypeDef::new("App", "FakeUtil"));
    let main = module.find_type("App.Program").unwrap();
    module.type_def_mut(main).methods[0].body = Some(MethodBody::new(vec![Instruction::call(util_method("Vanished")), Instruction::simple(OpCode::Ret)]));

    let mut sink = CollectingSink::new();
    let result = ModuleWeaver::default().execute(&mut module, &mut sink);
    assert!(matches!(result, Err(WeaveError::Module(_))));
}

#[test]
fn test_weave_with_callbacks() {
    let mut module = scenario(TypeDef::new("App", "FakeUtil"));
    let mut infos = Vec::new();
    let mut errors = Vec::new();

    let report = weave(&mut module, |m| infos.push(m.to_string()), |m| errors.push(m.to_string())).unwrap();

    assert_eq!(report.replacements, 1);
    assert_eq!(report.rewrite.unresolved_calls, 1);
    assert_eq!(report.attributes_removed, 1);
    assert!(report.reference_removed);
    assert_eq!(errors, vec!["Missing 'App.Util.Format()' in 'App.FakeUtil'"]);
    assert_eq!(infos, vec!["Removing reference to 'Ionad.dll'."]);
}
