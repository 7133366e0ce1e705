use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::BASE_KEY;

#[derive(Clone)]
enum Segment {
    Field(String),
    Index(usize),
    Key(String),
    Base(String),
}

/// The position inside the tree currently being read or written.
///
/// Displayed as `points[1].x`, `tags["red"]` or `__base__.Shape.sides`.
#[derive(Default, Clone)]
pub(super) struct FieldPath {
    stack: Vec<Segment>,
}

impl FieldPath {
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push_field(&mut self, name: &str) {
        self.stack.push(Segment::Field(name.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.stack.push(Segment::Index(index));
    }

    pub fn push_key(&mut self, key: &str) {
        self.stack.push(Segment::Key(key.into()));
    }

    pub fn push_base(&mut self, class: &str) {
        self.stack.push(Segment::Base(class.into()));
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stack.is_empty() {
            return f.write_str("<root>");
        }
        for (position, segment) in self.stack.iter().enumerate() {
            let dot = if position > 0 { "." } else { "" };
            match segment {
                Segment::Field(name) => write!(f, "{dot}{name}")?,
                Segment::Base(class) => write!(f, "{dot}{BASE_KEY}.{class}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::FieldPath;

    #[test]
    fn display() {
        let mut path = FieldPath::new();
        assert_eq!(path.to_string(), "<root>");

        path.push_base("Shape");
        path.push_field("points");
        path.push_index(1);
        path.push_field("x");
        assert_eq!(path.to_string(), "__base__.Shape.points[1].x");

        path.pop();
        path.pop();
        path.push_key("red");
        assert_eq!(path.to_string(), "__base__.Shape.points[\"red\"]");
    }
}
