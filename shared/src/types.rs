//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SharedError;

/// Unique identifier for a probe (one container deployment unit)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeId(Uuid);

impl ProbeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProbeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, hierarchical identifier for one invocable test unit
///
/// Two addresses are equal iff their signatures are equal. A child address
/// (parameterized invocation) keeps a back-reference to its top-level root;
/// the root of a root is itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestAddress {
    signature: String,
    caption: String,
    arguments: Vec<String>,
    root: Option<Box<TestAddress>>,
}

impl TestAddress {
    /// Create a top-level address for a `Type::method` registration
    pub fn root_address(caption: impl Into<String>) -> Self {
        let caption = caption.into();
        Self {
            signature: format!("{}-{}", caption, Uuid::new_v4().simple()),
            caption,
            arguments: Vec::new(),
            root: None,
        }
    }

    /// Create a child address under `parent` carrying bound arguments
    ///
    /// The back-reference is flattened to the top-level root, so `root()`
    /// never needs to walk more than one hop.
    pub fn child_address(parent: &TestAddress, arguments: Vec<String>) -> Self {
        let root = parent.root();
        Self {
            signature: format!("{}-{}", root.caption, Uuid::new_v4().simple()),
            caption: root.caption.clone(),
            arguments,
            root: Some(Box::new(root)),
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Resolve the top-level address of this hierarchy (self if top-level)
    pub fn root(&self) -> TestAddress {
        match &self.root {
            None => self.clone(),
            Some(root) => (**root).clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.root.is_none()
    }
}

impl PartialEq for TestAddress {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for TestAddress {}

impl std::hash::Hash for TestAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}

impl fmt::Display for TestAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.caption, self.signature)
    }
}

/// Instruction for reconstructing an invocable unit inside a container
///
/// The wire form is the plain string pair `"fully.qualified.Type;method"`,
/// the only serialization contract this core imposes on its environment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestInstantiationInstruction {
    type_name: String,
    method_name: String,
}

impl TestInstantiationInstruction {
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }
}

impl fmt::Display for TestInstantiationInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.type_name, self.method_name)
    }
}

impl FromStr for TestInstantiationInstruction {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(';') {
            Some((type_name, method_name)) if !type_name.is_empty() && !method_name.is_empty() => {
                Ok(Self::new(type_name, method_name))
            }
            _ => Err(SharedError::ProtocolError {
                message: format!("malformed instantiation instruction: '{s}'"),
            }),
        }
    }
}

/// Declarative provisioning instruction submitted to container staging
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionOption {
    /// Property made visible inside the container
    SystemProperty { key: String, value: String },
    /// Artifact provisioned into the container before tests run
    Artifact { url: String },
    /// Named feature enabled in the container runtime
    Feature { name: String },
}

impl fmt::Display for ProvisionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionOption::SystemProperty { key, value } => write!(f, "property {key}={value}"),
            ProvisionOption::Artifact { url } => write!(f, "artifact {url}"),
            ProvisionOption::Feature { name } => write!(f, "feature {name}"),
        }
    }
}

/// Descriptor for a test class entering the reactor
///
/// Carries everything the reactor needs to open a container boundary for
/// the class: its name, class-level provisioning options, and the flag the
/// runner integration honors to skip its own configuration hooks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestClassDescriptor {
    pub type_name: String,
    pub options: Vec<ProvisionOption>,
    pub suppress_config_hooks: bool,
}

impl TestClassDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            options: Vec::new(),
            suppress_config_hooks: false,
        }
    }

    pub fn with_option(mut self, option: ProvisionOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_suppressed_config_hooks(mut self) -> Self {
        self.suppress_config_hooks = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_distinct_per_registration() {
        let a = TestAddress::root_address("Sample.test_alpha");
        let b = TestAddress::root_address("Sample.test_alpha");
        assert_ne!(a, b);
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn root_is_idempotent() {
        let root = TestAddress::root_address("Sample.test_alpha");
        assert_eq!(root.root(), root);
        assert_eq!(root.root().root(), root);

        let child = TestAddress::child_address(&root, vec!["1".into()]);
        assert_eq!(child.root(), root);
        assert!(child.root().is_root());
    }

    #[test]
    fn child_of_child_flattens_to_top_level_root() {
        let root = TestAddress::root_address("Sample.test_alpha");
        let child = TestAddress::child_address(&root, vec!["1".into()]);
        let grandchild = TestAddress::child_address(&child, vec!["2".into()]);
        assert_eq!(grandchild.root(), root);
        assert_eq!(grandchild.arguments(), ["2".to_string()]);
    }

    #[test]
    fn equality_is_signature_only() {
        let root = TestAddress::root_address("Sample.test_alpha");
        let copy = root.clone();
        assert_eq!(root, copy);

        let sibling = TestAddress::child_address(&root, vec![]);
        assert_ne!(root, sibling);
    }

    #[test]
    fn instruction_round_trips_through_string_pair() {
        let instruction = TestInstantiationInstruction::new("regression::Sample", "test_alpha");
        let wire = instruction.to_string();
        assert_eq!(wire, "regression::Sample;test_alpha");
        assert_eq!(wire.parse::<TestInstantiationInstruction>().unwrap(), instruction);
    }

    #[test]
    fn address_serializes_with_its_root_reference() {
        let root = TestAddress::root_address("Sample.test_alpha");
        let child = TestAddress::child_address(&root, vec!["7".into()]);
        let json = serde_json::to_string(&child).unwrap();
        let back: TestAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, child);
        assert_eq!(back.root(), root);
    }

    #[test]
    fn malformed_instruction_is_rejected() {
        assert!("no-separator".parse::<TestInstantiationInstruction>().is_err());
        assert!(";method".parse::<TestInstantiationInstruction>().is_err());
        assert!("Type;".parse::<TestInstantiationInstruction>().is_err());
    }
}
