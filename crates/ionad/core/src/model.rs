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

//! Module, type and member definitions
//!
//! A [`Module`] owns every type, method body and library reference it
//! contains. Types are addressed by [`TypeId`], an index into the module's
//! type table; nothing in this crate reorders that table, so ids handed out
//! for a module stay valid while it is being rewritten.

use crate::body::MethodBody;
use crate::error::{ModuleError, ModuleResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a type, possibly living in another module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef {
    /// Defining module, `None` for the referencing module itself
    pub scope: Option<String>,
    pub namespace: String,
    pub name: String,
}

impl TypeRef {
    /// Reference a type defined in the current module
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: None,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Reference a type defined in another module
    pub fn external(scope: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            ..Self::new(namespace, name)
        }
    }

    /// Namespace-qualified name
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "[{scope}]{}", self.full_name()),
            None => write!(f, "{}", self.full_name()),
        }
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() { name.to_string() } else { format!("{namespace}.{name}") }
}

/// Compare against a namespace-qualified name without building it
fn is_qualified(namespace: &str, name: &str, full_name: &str) -> bool {
    if namespace.is_empty() {
        return name == full_name;
    }
    full_name
        .strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|rest| rest == name)
}

/// Parameter and return types of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    pub return_type: String,
    pub parameters: Vec<String>,
}

impl MethodSignature {
    pub const VOID: &'static str = "System.Void";

    /// Create a signature from a return type and parameter types
    pub fn new(return_type: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            return_type: return_type.into(),
            parameters,
        }
    }

    /// Parameterless method returning nothing
    pub fn void() -> Self {
        Self::new(Self::VOID, Vec::new())
    }
}

/// Reference to a method as it appears in an instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: TypeRef,
    pub name: String,
    /// Whether the call passes an implicit `this`
    pub has_this: bool,
    pub signature: MethodSignature,
}

impl MethodRef {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>, has_this: bool, signature: MethodSignature) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            has_this,
            signature,
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}::{}({})",
            if self.has_this { "instance " } else { "" },
            self.signature.return_type,
            self.declaring_type,
            self.name,
            self.signature.parameters.join(", ")
        )
    }
}

/// A method declared by a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub is_static: bool,
    pub is_virtual: bool,
    pub signature: MethodSignature,
    /// `None` for abstract and extern methods
    pub body: Option<MethodBody>,
}

impl MethodDef {
    /// Declare a static method without a body
    pub fn new_static(name: impl Into<String>, signature: MethodSignature) -> Self {
        Self {
            name: name.into(),
            is_static: true,
            is_virtual: false,
            signature,
            body: None,
        }
    }

    /// Declare an instance method without a body
    pub fn new_instance(name: impl Into<String>, signature: MethodSignature) -> Self {
        Self {
            is_static: false,
            ..Self::new_static(name, signature)
        }
    }

    /// Attach a body
    pub fn with_body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Build an operand reference to this method on `declaring_type`
    pub fn reference(&self, declaring_type: TypeRef) -> MethodRef {
        MethodRef::new(declaring_type, self.name.clone(), !self.is_static, self.signature.clone())
    }

    /// Whether `method` names this definition
    pub fn matches(&self, method: &MethodRef) -> bool {
        self.name == method.name && self.signature == method.signature
    }
}

/// A property and its accessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub getter: Option<MethodDef>,
    pub setter: Option<MethodDef>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            getter: None,
            setter: None,
        }
    }

    pub fn with_getter(mut self, getter: MethodDef) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_setter(mut self, setter: MethodDef) -> Self {
        self.setter = Some(setter);
        self
    }
}

/// Constructor argument of a custom attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeArgument {
    Type(TypeRef),
    String(String),
    Int32(i32),
    Bool(bool),
}

/// Declarative metadata attached to a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttribute {
    pub attribute_type: TypeRef,
    pub arguments: Vec<AttributeArgument>,
}

impl CustomAttribute {
    pub fn new(attribute_type: TypeRef, arguments: Vec<AttributeArgument>) -> Self {
        Self { attribute_type, arguments }
    }

    /// Whether this attribute is an instance of the named attribute type
    pub fn is(&self, full_name: &str) -> bool {
        is_qualified(&self.attribute_type.namespace, &self.attribute_type.name, full_name)
    }
}

/// A type declared in the module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub namespace: String,
    pub name: String,
    pub is_class: bool,
    pub methods: Vec<MethodDef>,
    pub properties: Vec<PropertyDef>,
    pub custom_attributes: Vec<CustomAttribute>,
}

impl TypeDef {
    /// Declare an empty class
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            is_class: true,
            methods: Vec::new(),
            properties: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }

    /// Namespace-qualified name
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    pub fn has_full_name(&self, full_name: &str) -> bool {
        is_qualified(&self.namespace, &self.name, full_name)
    }

    /// Reference to this type from inside its own module
    pub fn reference(&self) -> TypeRef {
        TypeRef::new(self.namespace.clone(), self.name.clone())
    }

    /// Declared methods followed by property getters and setters
    pub fn all_methods(&self) -> impl Iterator<Item = &MethodDef> {
        let accessors = self
            .properties
            .iter()
            .flat_map(|property| property.getter.iter().chain(property.setter.iter()));
        self.methods.iter().chain(accessors)
    }

    /// Attributes of the given type, in declaration order
    pub fn attributes_of<'a, 'n>(&'a self, full_name: &'n str) -> impl Iterator<Item = &'a CustomAttribute> {
        self.custom_attributes.iter().filter(move |attribute| attribute.is(full_name))
    }

    /// Remove every attribute of the given type, returning how many were removed
    pub fn remove_attributes(&mut self, full_name: &str) -> usize {
        let before = self.custom_attributes.len();
        self.custom_attributes.retain(|attribute| !attribute.is(full_name));
        before - self.custom_attributes.len()
    }
}

/// Entry in the module's table of external dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReference {
    pub name: String,
    pub version: String,
}

impl AssemblyReference {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Index of a type in its module's type table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

/// Which member of a type owns a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberSlot {
    Method(usize),
    Getter(usize),
    Setter(usize),
}

/// Location of one method body inside a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodySlot {
    pub type_id: TypeId,
    pub member: MemberSlot,
}

/// A method reference resolved to its definition
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMethod<'a> {
    pub declaring_type: TypeId,
    pub method: &'a MethodDef,
}

/// Unit of compiled output: types, their members and library references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub types: Vec<TypeDef>,
    pub assembly_references: Vec<AssemblyReference>,
}

impl Module {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            assembly_references: Vec::new(),
        }
    }

    /// Add a type, returning its id
    pub fn add_type(&mut self, type_def: TypeDef) -> TypeId {
        self.types.push(type_def);
        TypeId(self.types.len() - 1)
    }

    /// Add a library reference
    pub fn add_reference(&mut self, reference: AssemblyReference) {
        self.assembly_references.push(reference);
    }

    /// Get a type by id
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this module.
    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0]
    }

    /// Get a mutable type by id
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this module.
    pub fn type_def_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.types[id.0]
    }

    /// Iterate over every type with its id
    pub fn iter_types(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.types.iter().enumerate().map(|(index, type_def)| (TypeId(index), type_def))
    }

    /// Find a type by namespace-qualified name
    pub fn find_type(&self, full_name: &str) -> Option<TypeId> {
        self.iter_types().find(|(_, type_def)| type_def.has_full_name(full_name)).map(|(id, _)| id)
    }

    /// Whether a reference points into this module
    pub fn is_local(&self, type_ref: &TypeRef) -> bool {
        type_ref.scope.as_deref().is_none_or(|scope| scope == self.name)
    }

    /// Resolve a type reference to a type defined in this module
    pub fn resolve_type(&self, type_ref: &TypeRef) -> ModuleResult<TypeId> {
        if let Some(scope) = type_ref.scope.as_deref().filter(|scope| *scope != self.name) {
            return Err(ModuleError::ExternalType {
                type_name: type_ref.full_name(),
                scope: scope.to_string(),
                module: self.name.clone(),
            });
        }
        self.iter_types()
            .find(|(_, type_def)| type_def.namespace == type_ref.namespace && type_def.name == type_ref.name)
            .map(|(id, _)| id)
            .ok_or_else(|| ModuleError::unresolved_type(type_ref.full_name()))
    }

    /// Resolve a method reference by name, parameters and return type
    pub fn resolve_method(&self, method: &MethodRef) -> ModuleResult<ResolvedMethod<'_>> {
        let declaring_type = self.resolve_type(&method.declaring_type)?;
        self.type_def(declaring_type)
            .all_methods()
            .find(|candidate| candidate.matches(method))
            .map(|definition| ResolvedMethod {
                declaring_type,
                method: definition,
            })
            .ok_or_else(|| ModuleError::unresolved_method(method.to_string()))
    }

    /// Location of every method body in the module, methods before accessors
    pub fn body_slots(&self) -> Vec<BodySlot> {
        let mut slots = Vec::new();
        for (type_id, type_def) in self.iter_types() {
            for (index, method) in type_def.methods.iter().enumerate() {
                if method.body.is_some() {
                    slots.push(BodySlot {
                        type_id,
                        member: MemberSlot::Method(index),
                    });
                }
            }
            for (index, property) in type_def.properties.iter().enumerate() {
                if property.getter.as_ref().is_some_and(|getter| getter.body.is_some()) {
                    slots.push(BodySlot {
                        type_id,
                        member: MemberSlot::Getter(index),
                    });
                }
                if property.setter.as_ref().is_some_and(|setter| setter.body.is_some()) {
                    slots.push(BodySlot {
                        type_id,
                        member: MemberSlot::Setter(index),
                    });
                }
            }
        }
        slots
    }

    /// The method definition that owns a slot
    pub fn slot_method(&self, slot: BodySlot) -> Option<&MethodDef> {
        let type_def = self.types.get(slot.type_id.0)?;
        match slot.member {
            MemberSlot::Method(index) => type_def.methods.get(index),
            MemberSlot::Getter(index) => type_def.properties.get(index)?.getter.as_ref(),
            MemberSlot::Setter(index) => type_def.properties.get(index)?.setter.as_ref(),
        }
    }

    fn slot_method_mut(&mut self, slot: BodySlot) -> Option<&mut MethodDef> {
        let type_def = self.types.get_mut(slot.type_id.0)?;
        match slot.member {
            MemberSlot::Method(index) => type_def.methods.get_mut(index),
            MemberSlot::Getter(index) => type_def.properties.get_mut(index)?.getter.as_mut(),
            MemberSlot::Setter(index) => type_def.properties.get_mut(index)?.setter.as_mut(),
        }
    }

    /// Borrow the body stored in a slot
    pub fn body(&self, slot: BodySlot) -> Option<&MethodBody> {
        self.slot_method(slot)?.body.as_ref()
    }

    /// Detach the body stored in a slot so it can be edited while the rest
    /// of the module is read; pair every call with [`Module::restore_body`]
    pub fn take_body(&mut self, slot: BodySlot) -> Option<MethodBody> {
        self.slot_method_mut(slot)?.body.take()
    }

    /// Put a body back into its slot
    pub fn restore_body(&mut self, slot: BodySlot, body: MethodBody) {
        if let Some(method) = self.slot_method_mut(slot) {
            method.body = Some(body);
        }
    }

    /// Find a library reference by exact name
    pub fn find_reference(&self, name: &str) -> Option<usize> {
        self.assembly_references.iter().position(|reference| reference.name == name)
    }

    /// Validate every method body
    pub fn validate(&self) -> ModuleResult<()> {
        for slot in self.body_slots() {
            if let Some(body) = self.body(slot) {
                body.validate()?;
            }
        }
        Ok(())
    }
}
