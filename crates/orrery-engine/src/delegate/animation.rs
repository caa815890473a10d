/// Anything a delegate advances once per frame while it is playing.
///
/// Interpolation, repeat modes and listeners belong to the implementation; the
/// delegate only asks whether to advance and by how much.
pub trait Animation: Send + Sync {
    fn is_playing(&self) -> bool;

    /// Advances the animation by `dt` seconds.
    fn update(&self, dt: f64);
}
