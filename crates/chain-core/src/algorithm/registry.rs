use std::fmt;

use indexmap::IndexMap;

use super::Algorithm;

/// Fábrica que produce una instancia nueva del algoritmo por etapa.
pub type AlgorithmFactory = Box<dyn Fn() -> Box<dyn Algorithm> + Send + Sync>;

/// Registro explícito nombre -> fábrica.
///
/// Se llena al arrancar (por ejemplo con `register_builtin` de
/// `chain-algorithms`); el ejecutor resuelve cada etapa por nombre.
#[derive(Default)]
pub struct AlgorithmRegistry {
    factories: IndexMap<String, AlgorithmFactory>,
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmRegistry").field("names", &self.names()).finish()
    }
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o reemplaza) la fábrica de `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
        where F: Fn() -> Box<dyn Algorithm> + Send + Sync + 'static
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Atajo para algoritmos sin estado construibles con `Default`.
    pub fn register_default<A>(&mut self, name: impl Into<String>) -> &mut Self
        where A: Algorithm + Default + 'static
    {
        self.register(name, || Box::new(A::default()) as Box<dyn Algorithm>)
    }

    /// Variante encadenable para construir registros en una expresión.
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
        where F: Fn() -> Box<dyn Algorithm> + Send + Sync + 'static
    {
        self.register(name, factory);
        self
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Algorithm>> {
        self.factories.get(name).map(|f| f())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
