/// Use this to define a unique type which will be used as a key to retrieve
/// an independent rng stream from a [`RandomSource`](crate::random::RandomSource).
#[macro_export]
macro_rules! define_rng {
    ($random_id:ident) => {
        #[derive(Copy, Clone, Debug)]
        pub struct $random_id;

        impl $crate::random::RngId for $random_id {
            fn get_name() -> &'static str {
                stringify!($random_id)
            }
        }
    };
}
pub use define_rng;
