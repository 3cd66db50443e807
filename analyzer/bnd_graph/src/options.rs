/// Which references become graph edges.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Keep edges to packages that have no classes in the analyzed space.
    /// Their targets become vertices without outgoing edges.
    pub include_external: bool,
    /// Keep `java.*` packages. They are provided by every runtime and are
    /// never imported.
    pub include_java: bool,
}

impl GraphOptions {
    /// Options that keep every edge.
    pub fn everything() -> Self {
        GraphOptions {
            include_external: true,
            include_java: true,
        }
    }
}
