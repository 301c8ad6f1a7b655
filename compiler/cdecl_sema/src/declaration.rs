//! Resolved declarations and their storage properties.

use cdecl_ir::{ConstValue, Initializer, Name, ScopeKind, Span, StorageClass, Type};

/// Linkage of a declared name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Linkage {
    /// Visible to other units.
    External,
    /// Visible throughout this unit only.
    Internal,
    None,
}

/// A declaration after type resolution and storage classification.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Declaration {
    pub name: Name,
    pub ty: Type,
    pub storage: StorageClass,
    pub linkage: Linkage,
    pub is_const: bool,
    pub is_definition: bool,
    pub initializer: Option<Initializer>,
    /// Value of a `const` scalar initialized from a constant.
    pub constant: Option<ConstValue>,
    pub span: Span,
}

impl Declaration {
    /// Static and thread-local objects are zero-initialized before any
    /// initializer runs.
    pub fn is_zero_initialized(&self) -> bool {
        matches!(self.storage, StorageClass::Static | StorageClass::ThreadLocal)
    }

    /// Whether the object keeps one address for the whole run.
    pub fn is_address_stable(&self) -> bool {
        matches!(self.storage, StorageClass::Static | StorageClass::ThreadLocal)
    }

    /// Whether `self` and `other` cannot both be declared in one scope.
    ///
    /// Two definitions always conflict; otherwise the types must agree.
    pub fn conflicts_with(&self, other: &Declaration) -> bool {
        (self.is_definition && other.is_definition) || !self.ty.same_type(&other.ty)
    }
}

/// Storage duration and linkage for a declaration in a scope of `kind`.
pub fn classify_storage(
    kind: ScopeKind,
    explicit: Option<StorageClass>,
    is_const: bool,
    is_definition: bool,
) -> (StorageClass, Linkage) {
    if !is_definition {
        // `extern`: refers to an object defined elsewhere
        let storage = match explicit {
            Some(StorageClass::ThreadLocal) => StorageClass::ThreadLocal,
            _ => StorageClass::Static,
        };
        return (storage, Linkage::External);
    }

    match kind {
        _ if kind.is_namespace_level() => match explicit {
            None | Some(StorageClass::Automatic) if is_const => {
                (StorageClass::Static, Linkage::Internal)
            }
            None | Some(StorageClass::Automatic) => (StorageClass::Static, Linkage::External),
            Some(StorageClass::Static) => (StorageClass::Static, Linkage::Internal),
            Some(StorageClass::ThreadLocal) => (StorageClass::ThreadLocal, Linkage::External),
            Some(other @ (StorageClass::FreeStore | StorageClass::Temporary)) => {
                (other, Linkage::None)
            }
        },
        ScopeKind::Class => match explicit {
            None => (StorageClass::Automatic, Linkage::None),
            Some(StorageClass::Static) => (StorageClass::Static, Linkage::External),
            Some(StorageClass::ThreadLocal) => (StorageClass::ThreadLocal, Linkage::External),
            Some(other) => (other, Linkage::None),
        },
        // function, block and statement scopes
        _ => (explicit.unwrap_or(StorageClass::Automatic), Linkage::None),
    }
}
