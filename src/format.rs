//! Rendering the type algebra back to compact source text.
//!
//! The output is the crate's only external serialization, so it must
//! re-parse to a structurally equal AST: no extraneous whitespace, `|`
//! between union members, `,` between struct fields, double-quoted strings,
//! `[]` per array level. A literal that carries aliases or a pinned flag
//! renders in `LITERAL<...>` form so nothing is lost on the way back in.

use std::fmt::{self, Write};

use crate::ast::{Catalog, Define, Field, LitValue, Literal, Node, ParamDef, TypeRef};

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Never => f.write_str("never"),
            Node::Any => f.write_str("any"),
            Node::Literal(lit) => write!(f, "{lit}"),
            Node::Ref(r) => write!(f, "{r}"),
            Node::Param(name) => f.write_str(name),
            Node::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_char('|')?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            // A union element needs parens or the `[]` would bind to the
            // last member only.
            Node::Array(el) => match el.as_ref() {
                Node::Union(_) => write!(f, "({el})[]"),
                _ => write!(f, "{el}[]"),
            },
            Node::Struct(fields) => {
                f.write_char('{')?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_char('}')
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.optional {
            f.write_char('?')?;
        }
        write!(f, ":{}", self.ty)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_char('<')?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{arg}")?;
            }
            f.write_char('>')?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extended = !self.aliases.is_empty() || self.pinned;
        match (&self.value, extended) {
            // Only string primaries have an extended surface form.
            (LitValue::Str(s), true) => {
                f.write_str("LITERAL<")?;
                write_quoted(f, s)?;
                f.write_str(",[")?;
                for (i, alias) in self.aliases.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_quoted(f, alias)?;
                }
                write!(f, "],{}>", self.pinned)
            }
            _ => write!(f, "{}", self.value),
        }
    }
}

impl fmt::Display for LitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LitValue::Str(s) => write_quoted(f, s),
            LitValue::Int(i) => write!(f, "{i}"),
            // Keep a fractional marker so the value reparses as a float.
            LitValue::Float(x) if x.0.fract() == 0.0 && x.0.is_finite() => write!(f, "{:.1}", x.0),
            LitValue::Float(x) => write!(f, "{}", x.0),
        }
    }
}

impl fmt::Display for ParamDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(bound) = &self.bound {
            write!(f, " extends {bound}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hint in &self.hints {
            writeln!(f, "// {hint}")?;
        }
        write!(f, "type {}", self.name)?;
        if !self.params.is_empty() {
            f.write_char('<')?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{p}")?;
            }
            f.write_char('>')?;
        }
        write!(f, "={};", self.value)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for hint in &self.loose_hints {
            if !first {
                f.write_char('\n')?;
            }
            first = false;
            write!(f, "// {hint}")?;
        }
        for define in self.iter() {
            if !first {
                f.write_char('\n')?;
            }
            first = false;
            write!(f, "{define}")?;
        }
        Ok(())
    }
}

/// Double-quoted, JSON-style escaping.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use crate::ast::{Field, Literal, Node, TypeRef};
    use crate::parse::parse;

    #[test]
    fn compact_rendering() {
        let cat = parse("type A = { a : \"x\" | \"y\" , b ? : number } ;").unwrap();
        assert_eq!(cat.to_string(), "type A={a:\"x\"|\"y\",b?:number};");
    }

    #[test]
    fn array_of_union_gets_parens() {
        let node = Node::Array(Box::new(Node::Union(vec![
            Node::Literal(Literal::str("a")),
            Node::Literal(Literal::str("b")),
        ])));
        assert_eq!(node.to_string(), "(\"a\"|\"b\")[]");

        let plain = Node::Array(Box::new(Node::Ref(TypeRef::new("number", vec![]))));
        assert_eq!(plain.to_string(), "number[]");
    }

    #[test]
    fn strings_requote_and_reescape() {
        let node = Node::Literal(Literal::str("say \"hi\"\n"));
        assert_eq!(node.to_string(), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn extended_literal_form_preserves_aliases_and_pin() {
        let lit = Literal::str("err").with_aliases(vec!["failure".into()]).pinned();
        let node = Node::Literal(lit);
        assert_eq!(node.to_string(), "LITERAL<\"err\",[\"failure\"],true>");
    }

    #[test]
    fn struct_field_renders_optional_marker() {
        let field = Field { name: "b".into(), optional: true, ty: Node::Any };
        assert_eq!(field.to_string(), "b?:any");
    }

    #[test]
    fn round_trip_is_loss_free() {
        let sources = [
            "type A=\"x\"|\"y\"|7;",
            "type B<T extends string,U>={a:T,b?:U[],c:(\"p\"|\"q\")[]};",
            "type C=LITERAL<\"err\",[\"failure\",\"fault\"],true>;",
            "type D=Other<\"x\",{n:1.5}>;",
            "type E=never;",
            "type F=any[][];",
        ];
        for src in sources {
            let first = parse(src).unwrap();
            let rendered = first.to_string();
            let second = parse(&rendered).unwrap();
            assert_eq!(first, second, "round trip changed structure for {src}");
            assert_eq!(rendered, second.to_string(), "formatting is not a fixpoint for {src}");
        }
    }
}
