//! Type tokens and service keys: the unit of lookup in the container.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::container::ContainerError;

/// Most type arguments a closed service key can carry (request type + result type).
pub const MAX_TYPE_ARGS: usize = 2;

/// Runtime token for a type: its `TypeId` plus a readable name for diagnostics.
/// Equality and hashing use the id only.
#[derive(Clone, Copy, Debug)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Token for `T` shown under a custom name (e.g. a marker type standing for an open shape).
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Service key: an open type closed over zero, one or two type arguments.
///
/// `ServiceKey::of::<Db>()` keys a plain service. `ServiceKey::closed(open, &[a, b])`
/// keys a capability such as "command handler for `PlaceOrder` returning `OrderId`";
/// registration and dispatch must build the same key for routing to succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    open: TypeInfo,
    args: [Option<TypeInfo>; MAX_TYPE_ARGS],
}

impl ServiceKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            open: TypeInfo::of::<T>(),
            args: [None; MAX_TYPE_ARGS],
        }
    }

    /// Close `open` over `args` (positional: 0 = request type, 1 = result type).
    pub fn closed(open: TypeInfo, args: &[TypeInfo]) -> Result<Self, ContainerError> {
        if args.is_empty() || args.len() > MAX_TYPE_ARGS {
            return Err(ContainerError::InvalidServiceKey {
                open: open.name(),
                reason: format!(
                    "expected 1 to {} type arguments, got {}",
                    MAX_TYPE_ARGS,
                    args.len()
                ),
            });
        }
        let mut slots = [None; MAX_TYPE_ARGS];
        for (slot, arg) in slots.iter_mut().zip(args) {
            *slot = Some(*arg);
        }
        Ok(Self { open, args: slots })
    }

    pub fn open(&self) -> TypeInfo {
        self.open
    }

    /// Type arguments in positional order.
    pub fn args(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.args.iter().flatten().copied()
    }

    pub fn is_closed(&self) -> bool {
        self.args[0].is_some()
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.open.name())?;
        if self.is_closed() {
            f.write_str("<")?;
            for (i, arg) in self.args().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(arg.name())?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}
