/// Source of randomness for row selection.
///
/// `draw` returns `amount` distinct indices from `0..population`, in any
/// order. Callers guarantee `amount <= population`.
pub trait Sampler: Send {
    fn draw(&mut self, population: usize, amount: usize) -> Vec<usize>;
}
