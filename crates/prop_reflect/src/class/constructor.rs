use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use crate::TypeIdent;

// -----------------------------------------------------------------------------
// Signature

/// The exact, ordered parameter types of a constructor.
///
/// Matching is by equality only: `(i32, f32)` never matches `(i32,)` or
/// `(i64, f32)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature(Box<[TypeIdent]>);

impl Signature {
    /// The signature of the argument tuple `A`.
    #[inline]
    pub fn of<A: ConstructorArgs>() -> Self {
        A::signature()
    }

    #[inline]
    pub fn params(&self) -> &[TypeIdent] {
        &self.0
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, param) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param.type_name())?;
        }
        f.write_str(")")
    }
}

/// Argument tuples accepted by [`ClassDescriptor::create_instance`](super::ClassDescriptor::create_instance).
pub trait ConstructorArgs: Any {
    fn signature() -> Signature;
}

/// Something callable that builds a `T` from the tuple `Args`.
///
/// Implemented for every `Fn` of up to six parameters, so plain functions,
/// associated constructors and closures all qualify.
pub trait IntoConstructor<T, Args>: Send + Sync + 'static {
    fn construct(&self, args: Args) -> T;
}

macro_rules! impl_constructor_arity {
    ($($arg:ident),*) => {
        impl<$($arg: 'static),*> ConstructorArgs for ($($arg,)*) {
            fn signature() -> Signature {
                let params: Vec<TypeIdent> = alloc::vec![$(TypeIdent::of::<$arg>()),*];
                Signature(params.into_boxed_slice())
            }
        }

        impl<T, Func, $($arg),*> IntoConstructor<T, ($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> T + Send + Sync + 'static,
        {
            #[allow(non_snake_case, reason = "bindings reuse the type parameter names")]
            #[inline]
            fn construct(&self, ($($arg,)*): ($($arg,)*)) -> T {
                self($($arg),*)
            }
        }
    };
}

impl_constructor_arity!();
impl_constructor_arity!(A0);
impl_constructor_arity!(A0, A1);
impl_constructor_arity!(A0, A1, A2);
impl_constructor_arity!(A0, A1, A2, A3);
impl_constructor_arity!(A0, A1, A2, A3, A4);
impl_constructor_arity!(A0, A1, A2, A3, A4, A5);

// -----------------------------------------------------------------------------
// Constructor

type ErasedCall = Box<dyn Fn(Box<dyn Any>) -> Option<Box<dyn Any>> + Send + Sync>;

/// One registered constructor.
pub struct Constructor {
    signature: Signature,
    call: ErasedCall,
}

impl Constructor {
    pub fn new<T, A, F>(func: F) -> Self
    where
        T: Any,
        A: ConstructorArgs,
        F: IntoConstructor<T, A>,
    {
        Self {
            signature: A::signature(),
            call: Box::new(move |args: Box<dyn Any>| {
                let args = args.downcast::<A>().ok()?;
                Some(Box::new(func.construct(*args)) as Box<dyn Any>)
            }),
        }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Runs the constructor on a boxed argument tuple of the exact signature.
    #[inline]
    pub fn invoke(&self, args: Box<dyn Any>) -> Option<Box<dyn Any>> {
        (self.call)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor{}", self.signature)
    }
}

/// Constructor list collected by [`Class::register_constructors`](crate::Class::register_constructors).
pub struct Constructors<T> {
    list: Vec<Constructor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> Constructors<T> {
    pub(crate) fn new() -> Self {
        Self {
            list: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Registers `func` under the signature of its parameter list.
    pub fn add<A, F>(&mut self, func: F) -> &mut Self
    where
        A: ConstructorArgs,
        F: IntoConstructor<T, A>,
    {
        self.list.push(Constructor::new(func));
        self
    }

    /// Registers [`Default::default`] as the zero-argument constructor.
    pub fn add_default(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.add(T::default)
    }

    pub(crate) fn into_vec(self) -> Vec<Constructor> {
        self.list
    }
}

// -----------------------------------------------------------------------------
// Instance

/// An owned, type-erased instance produced by a constructor.
///
/// Dropping it (or passing it to
/// [`ClassDescriptor::destroy_instance`](super::ClassDescriptor::destroy_instance))
/// runs the destructor and frees the storage.
pub struct Instance {
    type_ident: TypeIdent,
    value: Box<dyn Any>,
}

impl Instance {
    #[inline]
    pub(crate) fn new(type_ident: TypeIdent, value: Box<dyn Any>) -> Self {
        Self { type_ident, value }
    }

    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.type_ident
    }

    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        &*self.value
    }

    #[inline]
    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut *self.value
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut()
    }

    /// Takes the value out, or hands the instance back on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<Box<T>, Self> {
        let type_ident = self.type_ident;
        self.value
            .downcast()
            .map_err(|value| Self { type_ident, value })
    }

    #[inline]
    pub fn into_any(self) -> Box<dyn Any> {
        self.value
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_ident)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
