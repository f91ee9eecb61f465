//! Graphviz projection of the dependency graph.
//!
//! A pure projection of the data model for the rendering toolchain:
//! one node per instance labeled with its id, sequence, and statements;
//! one directed edge per dependency labeled with the sorted variables
//! the two instances share. Nothing here is ever read back.

use std::fmt::Write;

use crate::space::Space;

impl Space {
    /// Render the dependency graph as Graphviz (dot) source
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from(
            r#"strict digraph "inst-graph" {
    graph [
        rankdir = "TB",
    ]
    rank = same
    node [
          fontsize=24
          shape=none
    ];
"#,
        );

        for inst in self.insts.values() {
            let cmds: Vec<String> = inst.cmds.iter().map(ToString::to_string).collect();
            let _ = writeln!(
                out,
                "n{} [label=\"id:{} seq:{}\\n{}\"]",
                inst.id,
                inst.id,
                inst.seq,
                cmds.join("\\n")
            );

            for &dep in &inst.deps {
                // edges to ids outside the space carry no label source
                let Some(target) = self.insts.get(&dep) else {
                    continue;
                };
                let shared: String = inst
                    .shared_vars(target)
                    .iter()
                    .map(|v| v.as_char())
                    .collect();
                let _ = writeln!(out, "n{} -> n{} [label=\"{}\"]", inst.id, dep, shared);
            }
        }

        out.push_str("}\n");
        out
    }
}
