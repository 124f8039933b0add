pub mod error;
pub mod tree;

/// The program context a diagnostic needs to render itself: the original
/// source text, from which positions are derived.
pub struct Context<'src> {
    pub src: &'src str,
}

/// Analogous to [`std::fmt::Display`], but also receives the program
/// [`Context`].
pub trait Show {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &Context<'_>) -> std::fmt::Result;

    /// Returns a type which can be displayed.
    fn display(&self, ctx: &Context<'_>) -> impl std::fmt::Display
    where
        Self: Sized,
    {
        Display(self, ctx)
    }
}

struct Display<'this, 'ctx, 'src, T: Show>(pub &'this T, pub &'ctx Context<'src>);

impl<T> std::fmt::Display for Display<'_, '_, '_, T>
where
    T: Show,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Display(this, ctx) = self;
        this.show(f, ctx)
    }
}
