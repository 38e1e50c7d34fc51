/// Declare the HAL modules once for every backend.
///
/// Each `mod` becomes a public module with a `HalOps` trait and one free
/// function per declared function. The free functions call the trait methods
/// on the `backend` type, which implements `HalOps` for each module with a
/// plain `impl` block. A function declared with a body is a default the
/// backend may override. A function declared without one panics with
/// `unimplemented!` unless the backend provides it.
macro_rules! hal_fn_def {
    (
        backend = $backend:ty;
        $(
            $(#[$mod_attr:meta])*
            pub mod $module:ident {
                $($fns:tt)*
            }
        )+
    ) => {
        $(
            $(#[$mod_attr])*
            pub mod $module {
                #![allow(unused_imports)]
                use super::*;

                /// Backend side of this module.
                pub(crate) trait HalOps {
                    __hal_fn!(@ops $module; $($fns)*);
                }

                __hal_fn!(@forward $backend; $($fns)*);
            }
        )+
    };
}

macro_rules! __hal_fn {
    (@ops $module:ident;) => {};
    (
        @ops $module:ident;
        $(#[$attr:meta])*
        pub fn $fn:ident($($arg:ident: $ty:ty),*) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        #[allow(unused_variables)]
        fn $fn($($arg: $ty),*) $(-> $ret)? {
            unimplemented!("{}::{}()", stringify!($module), stringify!($fn))
        }
        __hal_fn!(@ops $module; $($rest)*);
    };
    (
        @ops $module:ident;
        $(#[$attr:meta])*
        pub fn $fn:ident($($arg:ident: $ty:ty),*) $(-> $ret:ty)? $body:block
        $($rest:tt)*
    ) => {
        fn $fn($($arg: $ty),*) $(-> $ret)? $body
        __hal_fn!(@ops $module; $($rest)*);
    };

    (@forward $backend:ty;) => {};
    (
        @forward $backend:ty;
        $(#[$attr:meta])*
        pub fn $fn:ident($($arg:ident: $ty:ty),*) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        $(#[$attr])*
        pub fn $fn($($arg: $ty),*) $(-> $ret)? {
            <$backend as HalOps>::$fn($($arg),*)
        }
        __hal_fn!(@forward $backend; $($rest)*);
    };
    (
        @forward $backend:ty;
        $(#[$attr:meta])*
        pub fn $fn:ident($($arg:ident: $ty:ty),*) $(-> $ret:ty)? $body:block
        $($rest:tt)*
    ) => {
        $(#[$attr])*
        pub fn $fn($($arg: $ty),*) $(-> $ret)? {
            <$backend as HalOps>::$fn($($arg),*)
        }
        __hal_fn!(@forward $backend; $($rest)*);
    };
}
