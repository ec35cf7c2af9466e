#[cfg(debug_assertions)]
macro_rules! my_debug {
    ( $( $x:expr ),* ) => {
        $(
            log::trace!(target: $crate::constants::LOG_TARGET, "{} = {:?}", stringify!($x), $x);
        )*
    };
}

#[cfg(not(debug_assertions))]
macro_rules! my_debug {
    ($x:expr) => {
        std::convert::identity($x)
    };
    ($( $x:expr ),* ) => {
        ()
    };
}
