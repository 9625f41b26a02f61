//! Macro para declarar algoritmos tipados sin boilerplate.
//!
//! Exportada en la raíz del crate:
//!   use chain_core::typed_algorithm;

/// Declara un struct unitario que implementa `TypedAlgorithm`.
///
/// ```ignore
/// typed_algorithm! {
///     AddNumbers {
///         id: "add_numbers",
///         params: AddParams,
///         run(_self, ledger, p) {
///             ledger.add_to_metadata("result", p.a + p.b);
///             Ok(())
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! typed_algorithm {
    (
        $name:ident {
            id: $id:expr,
            params: $params:ty,
            run($self_ident:ident, $ledger_ident:ident, $p_ident:ident) $body:block
        }
    ) => {
        #[derive(Clone, Debug, Default)]
        pub struct $name;
        impl $name {
            pub fn new() -> Self {
                Self
            }
        }
        impl $crate::algorithm::TypedAlgorithm for $name {
            type Params = $params;
            fn id(&self) -> &'static str {
                $id
            }
            fn run_typed(&self,
                         $ledger_ident: &mut $crate::ledger::ChainLedger,
                         $p_ident: Self::Params)
                         -> $crate::algorithm::AlgorithmResult {
                let $self_ident = self;
                $body
            }
        }
    };
}
