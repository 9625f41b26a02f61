use indexmap::IndexMap;

use super::ChainDefinition;
use crate::params::AlgorithmDefinition;

/// Búsquedas externas del proyecto: definiciones de algoritmos y cadenas.
///
/// `None` significa "no encontrado". Una cadena sin etapas se trata igual
/// que una cadena inexistente.
pub trait ProjectStore: Send + Sync {
    fn algorithm_definition(&self, name: &str) -> Option<AlgorithmDefinition>;
    fn chain_definition(&self, name: &str) -> Option<ChainDefinition>;
    fn chain_names(&self) -> Vec<String>;
    fn algorithm_names(&self) -> Vec<String>;
}

/// Store en memoria, usado por tests y por la demo.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectStore {
    algorithms: IndexMap<String, AlgorithmDefinition>,
    chains: IndexMap<String, ChainDefinition>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_algorithm(&mut self, definition: AlgorithmDefinition) {
        self.algorithms.insert(definition.name.clone(), definition);
    }

    pub fn add_chain(&mut self, chain: ChainDefinition) {
        self.chains.insert(chain.name.clone(), chain);
    }

    pub fn with_algorithm(mut self, definition: AlgorithmDefinition) -> Self {
        self.add_algorithm(definition);
        self
    }

    pub fn with_chain(mut self, chain: ChainDefinition) -> Self {
        self.add_chain(chain);
        self
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn algorithm_definition(&self, name: &str) -> Option<AlgorithmDefinition> {
        self.algorithms.get(name).cloned()
    }

    fn chain_definition(&self, name: &str) -> Option<ChainDefinition> {
        self.chains.get(name).filter(|c| !c.is_empty()).cloned()
    }

    fn chain_names(&self) -> Vec<String> {
        self.chains.keys().cloned().collect()
    }

    fn algorithm_names(&self) -> Vec<String> {
        self.algorithms.keys().cloned().collect()
    }
}
