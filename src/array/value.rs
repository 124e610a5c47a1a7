//! Value storage strategies and dispatch between them.
//!
//! A property's configuration selects one of five layouts. [`ValueKind`]
//! names the layout, [`Value`] holds an opened value of any kind and the
//! `as_*` accessors recover the concrete strategy.

use std::fmt;

use super::{different_shape, same_shape};
use crate::container::Group;
use crate::core::{PropertyConfiguration, ShapePerObject, ShapeVariability, ValueVariability};
use crate::util::{Count, Datatype, Error, Rank, Result, Shape};

/// Storage layout of a property value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// One dataset, one row per object or per active object
    SameShape,
    /// One same-shape value per time location
    SameShapeVariableShape,
    /// One fixed-shape dataset per object
    DifferentShape,
    /// One growable dataset per object
    DifferentShapeConstantShape,
    /// One different-shape value per time location
    DifferentShapeVariableShape,
}

impl ValueKind {
    /// Layout selected by a property configuration.
    pub fn of(configuration: &PropertyConfiguration) -> Self {
        let variable_shape = configuration.value_variability == ValueVariability::Variable
            && configuration.shape_variability == Some(ShapeVariability::Variable);
        match (configuration.shape_per_object, configuration.value_variability) {
            (ShapePerObject::Same, ValueVariability::Constant) => Self::SameShape,
            (ShapePerObject::Same, ValueVariability::Variable) if variable_shape => {
                Self::SameShapeVariableShape
            }
            (ShapePerObject::Same, ValueVariability::Variable) => Self::SameShape,
            (ShapePerObject::Different, ValueVariability::Constant) => Self::DifferentShape,
            (ShapePerObject::Different, ValueVariability::Variable) if variable_shape => {
                Self::DifferentShapeVariableShape
            }
            (ShapePerObject::Different, ValueVariability::Variable) => {
                Self::DifferentShapeConstantShape
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SameShape => "same_shape",
            Self::SameShapeVariableShape => "same_shape::variable_shape",
            Self::DifferentShape => "different_shape",
            Self::DifferentShapeConstantShape => "different_shape::constant_shape",
            Self::DifferentShapeVariableShape => "different_shape::variable_shape",
        }
    }

    /// Whether all object arrays share one shape at a time.
    pub fn is_same_shape(&self) -> bool {
        matches!(self, Self::SameShape | Self::SameShapeVariableShape)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations shared by all value strategies.
pub trait ValueStrategy {
    fn kind(&self) -> ValueKind;

    /// Datatype of the persisted elements.
    fn file_datatype(&self) -> Datatype;

    /// Datatype of the elements in memory.
    fn memory_datatype(&self) -> Datatype;

    /// Rank of each object array.
    fn rank(&self) -> Rank;

    /// Number of stored values: arrays, objects or time locations,
    /// depending on the strategy.
    fn nr_values(&self) -> Result<Count>;

    fn pathname(&self) -> String;
}

/// Shape information needed to create a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueShape {
    /// Every object array has this shape
    Same(Shape),
    /// Object arrays have this rank, with shapes given per object
    Different(Rank),
}

impl ValueShape {
    pub fn rank(&self) -> Rank {
        match self {
            Self::Same(shape) => shape.rank(),
            Self::Different(rank) => *rank,
        }
    }

    /// Fail unless this is the shape information values of `kind` need.
    ///
    /// Same-shape values need the array shape. All other kinds only need
    /// a rank, though a same-shape variable-shape value accepts a shape too.
    pub fn check(&self, kind: ValueKind) -> Result<()> {
        let fits = match kind {
            ValueKind::SameShape => matches!(self, Self::Same(_)),
            ValueKind::SameShapeVariableShape => true,
            _ => matches!(self, Self::Different(_)),
        };
        if fits {
            Ok(())
        } else {
            Err(self.mismatch(kind))
        }
    }

    fn mismatch(&self, kind: ValueKind) -> Error {
        let expected = if kind == ValueKind::SameShape {
            "array shape"
        } else {
            "rank"
        };
        Error::type_mismatch(format!("{} of {} value", expected, kind), format!("{:?}", self))
    }
}

impl From<Shape> for ValueShape {
    fn from(shape: Shape) -> Self {
        Self::Same(shape)
    }
}

/// An opened value of any strategy.
#[derive(Clone, Debug)]
pub enum Value {
    SameShape(same_shape::Value),
    SameShapeVariableShape(same_shape::variable_shape::Value),
    DifferentShape(different_shape::Value),
    DifferentShapeConstantShape(different_shape::constant_shape::Value),
    DifferentShapeVariableShape(different_shape::variable_shape::Value),
}

macro_rules! dispatch {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Value::SameShape($inner) => $body,
            Value::SameShapeVariableShape($inner) => $body,
            Value::DifferentShape($inner) => $body,
            Value::DifferentShapeConstantShape($inner) => $body,
            Value::DifferentShapeVariableShape($inner) => $body,
        }
    };
}

macro_rules! downcast {
    ($as_ref:ident, $as_mut:ident, $variant:ident, $ty:ty) => {
        pub fn $as_ref(&self) -> Result<&$ty> {
            match self {
                Value::$variant(value) => Ok(value),
                other => Err(Error::type_mismatch(ValueKind::$variant, other.kind())),
            }
        }

        pub fn $as_mut(&mut self) -> Result<&mut $ty> {
            match self {
                Value::$variant(value) => Ok(value),
                other => Err(Error::type_mismatch(ValueKind::$variant, other.kind())),
            }
        }
    };
}

impl Value {
    /// Create a value `name` under `parent` using the layout of `configuration`.
    pub fn create(
        parent: &Group,
        name: &str,
        configuration: &PropertyConfiguration,
        file_datatype: Datatype,
        memory_datatype: Datatype,
        shape: &ValueShape,
    ) -> Result<Self> {
        let kind = ValueKind::of(configuration);
        shape.check(kind)?;
        let value = match kind {
            ValueKind::SameShape => {
                let ValueShape::Same(array_shape) = shape else {
                    return Err(shape.mismatch(kind));
                };
                Value::SameShape(same_shape::create_value(
                    parent,
                    name,
                    file_datatype,
                    memory_datatype,
                    array_shape,
                )?)
            }
            ValueKind::SameShapeVariableShape => Value::SameShapeVariableShape(
                same_shape::variable_shape::create_value(
                    parent,
                    name,
                    file_datatype,
                    memory_datatype,
                    shape.rank(),
                )?,
            ),
            ValueKind::DifferentShape => Value::DifferentShape(different_shape::create_value(
                parent,
                name,
                file_datatype,
                memory_datatype,
                shape.rank(),
            )?),
            ValueKind::DifferentShapeConstantShape => {
                Value::DifferentShapeConstantShape(different_shape::constant_shape::create_value(
                    parent,
                    name,
                    file_datatype,
                    memory_datatype,
                    shape.rank(),
                )?)
            }
            ValueKind::DifferentShapeVariableShape => {
                Value::DifferentShapeVariableShape(different_shape::variable_shape::create_value(
                    parent,
                    name,
                    file_datatype,
                    memory_datatype,
                    shape.rank(),
                )?)
            }
        };
        Ok(value)
    }

    /// Open the value `name` under `parent`, stored using the layout of
    /// `configuration`.
    pub fn open(
        parent: &Group,
        name: &str,
        configuration: &PropertyConfiguration,
        memory_datatype: Option<Datatype>,
    ) -> Result<Self> {
        let value = match (ValueKind::of(configuration), memory_datatype) {
            (ValueKind::SameShape, None) => Value::SameShape(same_shape::Value::open(parent, name)?),
            (ValueKind::SameShape, Some(dt)) => {
                Value::SameShape(same_shape::Value::open_with(parent, name, dt)?)
            }
            (ValueKind::SameShapeVariableShape, None) => Value::SameShapeVariableShape(
                same_shape::variable_shape::Value::open(parent, name)?,
            ),
            (ValueKind::SameShapeVariableShape, Some(dt)) => Value::SameShapeVariableShape(
                same_shape::variable_shape::Value::open_with(parent, name, dt)?,
            ),
            (ValueKind::DifferentShape, None) => {
                Value::DifferentShape(different_shape::Value::open(parent, name)?)
            }
            (ValueKind::DifferentShape, Some(dt)) => {
                Value::DifferentShape(different_shape::Value::open_with(parent, name, dt)?)
            }
            (ValueKind::DifferentShapeConstantShape, None) => Value::DifferentShapeConstantShape(
                different_shape::constant_shape::Value::open(parent, name)?,
            ),
            (ValueKind::DifferentShapeConstantShape, Some(dt)) => {
                Value::DifferentShapeConstantShape(
                    different_shape::constant_shape::Value::open_with(parent, name, dt)?,
                )
            }
            (ValueKind::DifferentShapeVariableShape, None) => Value::DifferentShapeVariableShape(
                different_shape::variable_shape::Value::open(parent, name)?,
            ),
            (ValueKind::DifferentShapeVariableShape, Some(dt)) => {
                Value::DifferentShapeVariableShape(
                    different_shape::variable_shape::Value::open_with(parent, name, dt)?,
                )
            }
        };
        Ok(value)
    }

    downcast!(as_same_shape, as_same_shape_mut, SameShape, same_shape::Value);
    downcast!(
        as_same_shape_variable_shape,
        as_same_shape_variable_shape_mut,
        SameShapeVariableShape,
        same_shape::variable_shape::Value
    );
    downcast!(
        as_different_shape,
        as_different_shape_mut,
        DifferentShape,
        different_shape::Value
    );
    downcast!(
        as_different_shape_constant_shape,
        as_different_shape_constant_shape_mut,
        DifferentShapeConstantShape,
        different_shape::constant_shape::Value
    );
    downcast!(
        as_different_shape_variable_shape,
        as_different_shape_variable_shape_mut,
        DifferentShapeVariableShape,
        different_shape::variable_shape::Value
    );
}

impl ValueStrategy for Value {
    fn kind(&self) -> ValueKind {
        dispatch!(self, v => v.kind())
    }

    fn file_datatype(&self) -> Datatype {
        dispatch!(self, v => v.file_datatype())
    }

    fn memory_datatype(&self) -> Datatype {
        dispatch!(self, v => v.memory_datatype())
    }

    fn rank(&self) -> Rank {
        dispatch!(self, v => v.rank())
    }

    fn nr_values(&self) -> Result<Count> {
        dispatch!(self, v => v.nr_values())
    }

    fn pathname(&self) -> String {
        dispatch!(self, v => v.pathname())
    }
}

/// Concrete strategies a [`Value`] can be down-cast to.
pub trait ValueVariant: ValueStrategy + Sized {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<&Self>;

    fn from_value_mut(value: &mut Value) -> Option<&mut Self>;
}

macro_rules! value_variant {
    ($variant:ident, $ty:ty) => {
        impl ValueVariant for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_value_mut(value: &mut Value) -> Option<&mut Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

value_variant!(SameShape, same_shape::Value);
value_variant!(SameShapeVariableShape, same_shape::variable_shape::Value);
value_variant!(DifferentShape, different_shape::Value);
value_variant!(DifferentShapeConstantShape, different_shape::constant_shape::Value);
value_variant!(DifferentShapeVariableShape, different_shape::variable_shape::Value);

impl Value {
    /// Down-cast to strategy `S`.
    pub fn downcast<S: ValueVariant>(&self) -> Result<&S> {
        S::from_value(self).ok_or_else(|| Error::type_mismatch(S::KIND, self.kind()))
    }

    pub fn downcast_mut<S: ValueVariant>(&mut self) -> Result<&mut S> {
        let kind = self.kind();
        S::from_value_mut(self).ok_or_else(|| Error::type_mismatch(S::KIND, kind))
    }
}
