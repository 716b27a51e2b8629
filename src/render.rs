//! ASCII renderings of a tree, rebuilt from its preorder and inorder descriptors.
//!
//! Rendering never looks at an [`AvlTree`](crate::AvlTree) directly. A [`Shape`] is reconstructed
//! from the two sequences returned by [`preorder`](crate::AvlTree::preorder) and
//! [`inorder`](crate::AvlTree::inorder), then written out in one of three [`Style`]s.

use std::{collections::VecDeque, fmt, str::FromStr};

/// Errors raised while rebuilding or rendering a [`Shape`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Traversal lengths differ: {preorder} preorder labels, {inorder} inorder labels.")]
    LengthMismatch { preorder: usize, inorder: usize },
    #[error("Invalid pair of in/pre-order sequences.")]
    InvalidTraversal,
    #[error("Unknown print style `{0}`; expected horizontal, symmetric or vertical.")]
    UnknownStyle(String),
    #[error("Failed to write the rendering.")]
    Write(#[from] fmt::Error),
}

/// The layout used by [`Shape::write`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Style {
    /// Each parent is drawn left-aligned above its left child.
    Horizontal,
    /// Each parent is drawn centred between its children.
    #[default]
    Symmetric,
    /// An outline, one node per line, right subtree first.
    Vertical,
}

impl FromStr for Style {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Style::Horizontal),
            "symmetric" => Ok(Style::Symmetric),
            "vertical" => Ok(Style::Vertical),
            other => Err(RenderError::UnknownStyle(other.to_string())),
        }
    }
}

struct Cell {
    label: String,
    children: [Option<usize>; 2],
}

impl Cell {
    fn left(&self) -> Option<usize> {
        self.children[0]
    }

    fn right(&self) -> Option<usize> {
        self.children[1]
    }

    fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    fn width(&self) -> usize {
        self.label.chars().count()
    }
}

/// The shape of a binary tree whose nodes carry text labels.
pub struct Shape {
    cells: Vec<Cell>,
    root: Option<usize>,
}

// A piece of text and the column it starts at.
struct Text {
    text: String,
    pos: usize,
}

impl Text {
    fn new(text: impl Into<String>, pos: usize) -> Text {
        Text {
            text: text.into(),
            pos,
        }
    }
}

#[derive(Copy, Clone)]
struct Coordinate {
    // Width of the box enclosing the subtree.
    width: usize,
    // Column within the box that the parent's connective points at.
    offset: usize,
}

const MISSING: &str = "x";

impl Shape {
    /// Rebuilds a tree shape from its preorder and inorder label sequences.
    ///
    /// Labels must be unique, as the `key(balance)` descriptors of a tree always are.
    pub fn from_traversals<S: AsRef<str>>(
        preorder: &[S],
        inorder: &[S],
    ) -> Result<Shape, RenderError> {
        if preorder.len() != inorder.len() {
            return Err(RenderError::LengthMismatch {
                preorder: preorder.len(),
                inorder: inorder.len(),
            });
        }

        let mut shape = Shape {
            cells: Vec::with_capacity(preorder.len()),
            root: None,
        };
        shape.root = shape.build(preorder, inorder)?;

        Ok(shape)
    }

    fn build<S: AsRef<str>>(
        &mut self,
        preorder: &[S],
        inorder: &[S],
    ) -> Result<Option<usize>, RenderError> {
        let Some((label, preorder_rest)) = preorder.split_first() else {
            return Ok(None);
        };
        let label = label.as_ref();

        // The root splits the inorder window into the left and right subtrees.
        let split = inorder
            .iter()
            .position(|candidate| candidate.as_ref() == label)
            .ok_or(RenderError::InvalidTraversal)?;

        let (left_preorder, right_preorder) = preorder_rest.split_at(split);
        let left = self.build(left_preorder, &inorder[..split])?;
        let right = self.build(right_preorder, &inorder[split + 1..])?;

        self.cells.push(Cell {
            label: label.to_string(),
            children: [left, right],
        });

        Ok(Some(self.cells.len() - 1))
    }

    /// Returns `true` if the shape has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn label(&self, cell: Option<usize>) -> &str {
        cell.map(|cell| self.cells[cell].label.as_str())
            .unwrap_or(MISSING)
    }

    /// Writes the shape in the given style. An empty shape writes nothing.
    pub fn write<W: fmt::Write>(&self, style: Style, w: &mut W) -> Result<(), RenderError> {
        match style {
            Style::Horizontal => self.write_horizontal(w)?,
            Style::Symmetric => self.write_symmetric(w)?,
            Style::Vertical => self.write_vertical(w)?,
        }

        Ok(())
    }

    /// Renders the shape into a new string.
    pub fn render(&self, style: Style) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write(style, &mut out)?;
        Ok(out)
    }

    /// Writes the shape level by level, each parent left-aligned over its left subtree:
    ///
    /// ```text
    /// 20(0)__
    /// |      \
    /// 10(0)   30(0)
    /// ```
    pub fn write_horizontal<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        let Some(root) = self.root else {
            return Ok(());
        };

        // Subtree width: max(label, left width) + 1 + right width. A missing child is 1 wide.
        let mut widths = vec![0; self.cells.len()];
        self.visit_postorder(root, &mut |cell| {
            let c = &self.cells[cell];
            let left = c.left().map_or(1, |left| widths[left]);
            let right = c.right().map_or(1, |right| widths[right]);
            widths[cell] = c.width().max(left) + 1 + right;
        });
        let width_of = |child: Option<usize>| child.map_or(1, |child| widths[child]);

        let mut queue = VecDeque::new();
        queue.push_back((Some(root), 0));

        while !queue.is_empty() {
            let mut nodes = Vec::new();
            let mut connectives = Vec::new();

            for _ in 0..queue.len() {
                let Some((cell, indent)) = queue.pop_front() else {
                    break;
                };

                let c = match cell {
                    Some(cell) if !self.cells[cell].is_leaf() => &self.cells[cell],
                    _ => {
                        nodes.push(Text::new(self.label(cell), indent));
                        continue;
                    }
                };

                let span = c.width().max(width_of(c.left()));
                queue.push_back((c.left(), indent));
                queue.push_back((c.right(), indent + span + 1));

                let filler = format!("{}{}", c.label, "_".repeat(span - c.width()));
                connectives.push(Text::new("|", indent));
                connectives.push(Text::new("\\", indent + span));
                nodes.push(Text::new(filler, indent));
            }

            write_line(w, &nodes)?;
            write_line(w, &connectives)?;
        }

        Ok(())
    }

    // Computes the box of every subtree for the symmetric layout.
    //
    // - A missing child is 1 wide with offset 1.
    // - A leaf is as wide as its label, with the offset at its middle.
    // - Otherwise the children's boxes are placed `x` columns apart, where `x` is the smallest gap
    //   that still fits the label and its two connectives between the children's offsets.
    fn coordinates(&self, root: usize) -> Vec<Coordinate> {
        let mut coordinates = vec![
            Coordinate {
                width: 1,
                offset: 1
            };
            self.cells.len()
        ];

        self.visit_postorder(root, &mut |cell| {
            let c = &self.cells[cell];

            coordinates[cell] = if c.is_leaf() {
                Coordinate {
                    width: c.width(),
                    offset: 1 + c.width() / 2,
                }
            } else {
                let lc = coordinate_of(&coordinates, c.left());
                let rc = coordinate_of(&coordinates, c.right());
                let x = gap(c.width(), lc, rc);

                Coordinate {
                    width: lc.width + rc.width + x,
                    offset: lc.offset + 1 + (lc.width + rc.offset + x - 1 - lc.offset) / 2,
                }
            };
        });

        coordinates
    }

    /// Writes the shape level by level, each parent centred between its children:
    ///
    /// ```text
    ///     20(0)
    ///    /     \
    /// 10(0)   30(0)
    /// ```
    pub fn write_symmetric<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        let Some(root) = self.root else {
            return Ok(());
        };

        let coordinates = self.coordinates(root);

        let mut queue = VecDeque::new();
        queue.push_back((Some(root), 0));

        while !queue.is_empty() {
            let mut nodes = Vec::new();
            let mut connectives = Vec::new();

            for _ in 0..queue.len() {
                let Some((cell, indent)) = queue.pop_front() else {
                    break;
                };

                let c = match cell {
                    Some(cell) if !self.cells[cell].is_leaf() => &self.cells[cell],
                    _ => {
                        nodes.push(Text::new(self.label(cell), indent));
                        continue;
                    }
                };

                let lc = coordinate_of(&coordinates, c.left());
                let rc = coordinate_of(&coordinates, c.right());
                let x = gap(c.width(), lc, rc);

                queue.push_back((c.left(), indent));
                queue.push_back((c.right(), indent + lc.width + x));

                // Underscores between the two connectives, split evenly around the label.
                let filler = (x + lc.width + rc.width)
                    .saturating_sub(2 + lc.offset + (rc.width + 1).saturating_sub(rc.offset))
                    .saturating_sub(c.width());
                let label = format!(
                    "{}{}{}",
                    "_".repeat(filler / 2),
                    c.label,
                    "_".repeat(filler - filler / 2)
                );

                nodes.push(Text::new(label, indent + lc.offset + 1));
                connectives.push(Text::new("/", indent + lc.offset));
                connectives.push(Text::new(
                    "\\",
                    (indent + lc.width + x + rc.offset).saturating_sub(2),
                ));
            }

            write_line(w, &nodes)?;
            write_line(w, &connectives)?;
        }

        Ok(())
    }

    /// Writes the shape as an outline, right subtree above left subtree:
    ///
    /// ```text
    /// 20(0)
    /// |__30(0)
    /// |
    /// |__10(0)
    /// ```
    pub fn write_vertical<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        let Some(root) = self.root else {
            return Ok(());
        };

        let mut bars = vec![1];
        self.write_outline(w, Some(root), &mut bars)
    }

    // Writes `cell` and its subtrees, assuming the `|__` leading to it is already written.
    //
    // `bars` holds the gaps between the vertical bars of all open ancestors.
    fn write_outline<W: fmt::Write>(
        &self,
        w: &mut W,
        cell: Option<usize>,
        bars: &mut Vec<usize>,
    ) -> fmt::Result {
        writeln!(w, "{}", self.label(cell))?;

        let Some(c) = cell.map(|cell| &self.cells[cell]) else {
            return Ok(());
        };

        if c.is_leaf() {
            return Ok(());
        }

        write_bars(w, bars, true)?;
        bars.push(3);
        self.write_outline(w, c.right(), bars)?;
        bars.pop();

        // Transitional line between the two children.
        write_bars(w, bars, false)?;
        writeln!(w)?;

        write_bars(w, bars, true)?;
        if let Some(last) = bars.last_mut() {
            *last += 3;
        }
        self.write_outline(w, c.left(), bars)
    }

    fn visit_postorder(&self, cell: usize, visit: &mut impl FnMut(usize)) {
        for child in self.cells[cell].children.into_iter().flatten() {
            self.visit_postorder(child, visit);
        }

        visit(cell);
    }
}

fn coordinate_of(coordinates: &[Coordinate], cell: Option<usize>) -> Coordinate {
    cell.map_or(
        Coordinate {
            width: 1,
            offset: 1,
        },
        |cell| coordinates[cell],
    )
}

// Columns separating the left and right boxes of a node with a `width`-wide label.
fn gap(width: usize, lc: Coordinate, rc: Coordinate) -> usize {
    let needed = width + lc.offset + rc.width + 2 - rc.offset;
    needed.max(lc.width + rc.width) - lc.width - rc.width + 1
}

// Writes each text so that it starts at its column, then ends the line.
fn write_line<W: fmt::Write>(w: &mut W, texts: &[Text]) -> fmt::Result {
    let mut cur_pos = 0;

    for Text { text, pos } in texts {
        let new_pos = pos + text.chars().count();
        let width = new_pos.saturating_sub(cur_pos);
        write!(w, "{text:>width$}")?;
        cur_pos = cur_pos.max(new_pos);
    }

    writeln!(w)
}

fn write_bars<W: fmt::Write>(w: &mut W, bars: &[usize], underscore: bool) -> fmt::Result {
    for &width in bars {
        write!(w, "{:>width$}", "|")?;
    }

    if underscore {
        w.write_str("__")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AvlTree;

    fn shape_of(keys: &[u32]) -> Shape {
        let tree: AvlTree<u32> = keys.iter().copied().collect();
        Shape::from_traversals(&tree.preorder(), &tree.inorder()).expect("valid traversals")
    }

    #[test]
    fn empty_renders_nothing() {
        let shape = shape_of(&[]);
        assert!(shape.is_empty());

        for style in [Style::Horizontal, Style::Symmetric, Style::Vertical] {
            assert_eq!(shape.render(style).unwrap(), "");
        }
    }

    #[test]
    fn single_node() {
        let shape = shape_of(&[7]);

        assert_eq!(shape.render(Style::Horizontal).unwrap(), "7(0)\n\n");
        assert_eq!(shape.render(Style::Symmetric).unwrap(), "7(0)\n\n");
        assert_eq!(shape.render(Style::Vertical).unwrap(), "7(0)\n");
    }

    #[test]
    fn three_nodes_horizontal() {
        let shape = shape_of(&[20, 10, 30]);

        assert_eq!(
            shape.render(Style::Horizontal).unwrap(),
            "20(0)__\n|      \\\n10(0)   30(0)\n\n"
        );
    }

    #[test]
    fn three_nodes_symmetric() {
        let shape = shape_of(&[20, 10, 30]);

        assert_eq!(
            shape.render(Style::Symmetric).unwrap(),
            "    20(0)\n   /     \\\n10(0)   30(0)\n\n"
        );
    }

    #[test]
    fn three_nodes_vertical() {
        let shape = shape_of(&[20, 10, 30]);

        assert_eq!(
            shape.render(Style::Vertical).unwrap(),
            "20(0)\n|__30(0)\n|\n|__10(0)\n"
        );
    }

    #[test]
    fn missing_child_is_marked() {
        let shape = shape_of(&[10, 20]);

        assert_eq!(
            shape.render(Style::Vertical).unwrap(),
            "10(-1)\n|__20(0)\n|\n|__x\n"
        );

        let horizontal = shape.render(Style::Horizontal).unwrap();
        let lines: Vec<&str> = horizontal.lines().collect();
        assert_eq!(lines[0], "10(-1)");
        assert_eq!(lines[1], "|     \\");
        assert_eq!(lines[2], "x      20(0)");
    }

    #[test]
    fn every_label_is_rendered() {
        let keys = [8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15];
        let tree: AvlTree<u32> = keys.iter().copied().collect();
        let shape = Shape::from_traversals(&tree.preorder(), &tree.inorder()).unwrap();

        for style in [Style::Horizontal, Style::Symmetric, Style::Vertical] {
            let out = shape.render(style).unwrap();

            for label in tree.inorder() {
                assert!(out.contains(&label), "{style:?} rendering lacks {label}");
            }
        }
    }

    #[test]
    fn mismatched_lengths() {
        let err = Shape::from_traversals(&["1(0)", "2(0)"], &["1(0)"]).err();

        assert_eq!(
            err,
            Some(RenderError::LengthMismatch {
                preorder: 2,
                inorder: 1
            })
        );
    }

    #[test]
    fn inconsistent_traversals() {
        let err = Shape::from_traversals(&["2(0)", "1(0)"], &["1(0)", "3(0)"]).err();

        assert_eq!(err, Some(RenderError::InvalidTraversal));
    }

    #[test]
    fn style_names() {
        assert_eq!("vertical".parse::<Style>(), Ok(Style::Vertical));
        assert_eq!("horizontal".parse::<Style>(), Ok(Style::Horizontal));
        assert_eq!("symmetric".parse::<Style>(), Ok(Style::Symmetric));
        assert_eq!(
            "diagonal".parse::<Style>(),
            Err(RenderError::UnknownStyle("diagonal".to_string()))
        );
    }
}
