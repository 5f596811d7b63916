/// Constructs values on behalf of the parser.
///
/// The parser is polymorphic over its value type: it parses the grammar and
/// delegates every construction decision to a `Build` implementation. A
/// builder producing a plain tree, one producing only the keys it cares
/// about, or one computing a digest are all equally valid.
///
/// # Associated Types
///
/// - `Value`: the finished JSON value type.
/// - `Frame`: an open array or object under construction. Frames are owned
///   by the parser's checkpoint stack while open and given back to
///   [`finish`](Self::finish) at the matching close.
///
/// # Contract
///
/// - `add_key` is invoked only on frames created by
///   [`begin_object`](Self::begin_object), always before the `add_value`
///   call for the keyed member. Duplicate keys are passed through in input
///   order; the builder decides how to treat them.
/// - `add_value` is invoked on array frames per element and on object
///   frames per member, in input order.
/// - [`number`](Self::number) receives the raw RFC 8259 literal and a flag
///   telling whether a fraction or exponent appeared. The parser performs no
///   numeric interpretation; fidelity versus convenience is the builder's
///   trade to make.
/// - Methods take `&self` so stateless builders compile to zero-sized types.
/// - Methods are infallible. A builder that cannot construct its value has
///   no recoverable path through the parser; treat that as fatal.
///
/// # Example
///
/// ```ignore
/// struct CountBuild;
///
/// impl Build for CountBuild {
///     type Value = usize;
///     type Frame = usize;
///
///     fn begin_array(&self) -> usize { 0 }
///     fn begin_object(&self) -> usize { 0 }
///     fn add_key(&self, _: &mut usize, _: &str) {}
///     fn add_value(&self, frame: &mut usize, value: usize) { *frame += value }
///     fn finish(&self, frame: usize) -> usize { frame }
///
///     fn null(&self) -> usize { 1 }
///     fn boolean(&self, _: bool) -> usize { 1 }
///     fn string(&self, _: &str) -> usize { 1 }
///     fn number(&self, _: &str, _: bool) -> usize { 1 }
/// }
/// ```
pub trait Build {
    /// The finished JSON value type.
    type Value;
    /// An open container under construction.
    type Frame;

    /// Open an array frame. Called when the parser consumes `[`.
    fn begin_array(&self) -> Self::Frame;

    /// Open an object frame. Called when the parser consumes `{`.
    fn begin_object(&self) -> Self::Frame;

    /// Store the key for the next member of an object frame.
    fn add_key(&self, frame: &mut Self::Frame, key: &str);

    /// Append a finished value to the innermost open container.
    fn add_value(&self, frame: &mut Self::Frame, value: Self::Value);

    /// Close a frame into a finished value. Called at the matching `]`/`}`.
    fn finish(&self, frame: Self::Frame) -> Self::Value;

    /// Produce the `null` value.
    fn null(&self) -> Self::Value;

    /// Produce `true` or `false`.
    fn boolean(&self, value: bool) -> Self::Value;

    /// Produce a string value from decoded text.
    fn string(&self, text: &str) -> Self::Value;

    /// Produce a number from its source literal.
    ///
    /// `float` is true iff the literal contained `.`, `e`, or `E`.
    fn number(&self, literal: &str, float: bool) -> Self::Value;
}
