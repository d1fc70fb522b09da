//! Compile-time constant evaluation.
//!
//! [`const_value`] follows the Java rules for constant expressions: literals,
//! `final` variables of primitive or `String` type initialized with a constant,
//! and operators, casts and conditionals over constants. Anything else,
//! including division by zero, is not a constant.

use std::collections::HashSet;

use vigil_syntax::{BinaryOp, Constant, NodeData, NodeRef, Symbol, UnaryOp};
use vigil_types::{PrimitiveType, Type, TypeEnv};

use crate::Context;

/// Nesting limit for constant variables that refer to each other.
const MAX_DEPTH: usize = 32;

pub fn const_value(ctx: &Context<'_>, node: NodeRef<'_>) -> Option<Constant> {
    Evaluator {
        ctx,
        visiting: HashSet::new(),
    }
    .eval(node, 0)
}

/// Three-valued boolean evaluation.
///
/// Unlike [`const_value`], `&&` and `||` short-circuit over unknown operands:
/// `false && x` is `false` and `true || x` is `true` whatever `x` is.
pub fn boolean_value(ctx: &Context<'_>, node: NodeRef<'_>) -> Option<bool> {
    let node = crate::strip_parentheses(node);
    match node.data() {
        NodeData::Binary { op, lhs, rhs } if op.is_conditional() => {
            let l = boolean_value(ctx, node.at(*lhs));
            let r = boolean_value(ctx, node.at(*rhs));
            match op {
                BinaryOp::And => match (l, r) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                },
                _ => match (l, r) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                },
            }
        }
        NodeData::Unary {
            op: UnaryOp::Not,
            operand,
        } => boolean_value(ctx, node.at(*operand)).map(|v| !v),
        _ => const_value(ctx, node)?.as_bool(),
    }
}

struct Evaluator<'c, 'a> {
    ctx: &'c Context<'a>,
    visiting: HashSet<Symbol>,
}

impl Evaluator<'_, '_> {
    fn eval(&mut self, node: NodeRef<'_>, depth: usize) -> Option<Constant> {
        if depth > MAX_DEPTH {
            return None;
        }
        match node.data() {
            NodeData::Literal { value } => value.clone(),
            NodeData::Parenthesized { expr } => self.eval(node.at(*expr), depth + 1),
            NodeData::Identifier { .. } | NodeData::MemberSelect { .. } => {
                self.variable(node, depth)
            }
            NodeData::Unary { op, operand } => {
                let value = self.eval(node.at(*operand), depth + 1)?;
                unary(*op, value)
            }
            NodeData::Binary { op, lhs, rhs } => {
                let l = self.eval(node.at(*lhs), depth + 1)?;
                let r = self.eval(node.at(*rhs), depth + 1)?;
                binary(*op, l, r)
            }
            NodeData::TypeCast { ty, expr } => {
                let value = self.eval(node.at(*expr), depth + 1)?;
                let target = node.at(*ty).ty()?;
                cast(self.ctx.env(), value, target)
            }
            NodeData::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let cond = self.eval(node.at(*cond), depth + 1)?.as_bool()?;
                let a = self.eval(node.at(*then_expr), depth + 1)?;
                let b = self.eval(node.at(*else_expr), depth + 1)?;
                let chosen = if cond { a } else { b };
                // Both arms are converted to the conditional's type.
                match node.ty() {
                    Some(ty) => cast(self.ctx.env(), chosen, ty),
                    None => Some(chosen),
                }
            }
            _ => None,
        }
    }

    fn variable(&mut self, node: NodeRef<'_>, depth: usize) -> Option<Constant> {
        let symbol = node.symbol()?;
        let (modifiers, ty) = match symbol {
            Symbol::Field(id) => {
                let field = self.ctx.env().field(id)?;
                if let Some(value) = &field.constant {
                    return Some(value.clone());
                }
                (field.modifiers, field.ty.clone())
            }
            Symbol::Local(id) => {
                let local = self.ctx.unit().semantics().local(id)?;
                (local.modifiers, local.ty.clone())
            }
            _ => return None,
        };
        if !modifiers.is_final() || !is_constant_type(self.ctx.env(), &ty) {
            return None;
        }
        let decl = self.ctx.unit().semantics().decl(symbol)?;
        let NodeData::Variable { init: Some(init), .. } = self.ctx.node(decl)?.data() else {
            return None;
        };
        if !self.visiting.insert(symbol) {
            return None;
        }
        let init = self.ctx.node(*init)?;
        let value = self.eval(init, depth + 1);
        self.visiting.remove(&symbol);
        cast(self.ctx.env(), value?, &ty)
    }
}

fn is_constant_type(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.is_primitive() || ty.class_id() == Some(env.well_known().string)
}

fn unary(op: UnaryOp, value: Constant) -> Option<Constant> {
    use Constant::*;
    match (op, promote_unary(value)?) {
        (UnaryOp::Not, Bool(v)) => Some(Bool(!v)),
        (UnaryOp::Plus, v @ (Int(_) | Long(_) | Float(_) | Double(_))) => Some(v),
        (UnaryOp::Minus, Int(v)) => Some(Int(v.wrapping_neg())),
        (UnaryOp::Minus, Long(v)) => Some(Long(v.wrapping_neg())),
        (UnaryOp::Minus, Float(v)) => Some(Float(-v)),
        (UnaryOp::Minus, Double(v)) => Some(Double(-v)),
        (UnaryOp::BitNot, Int(v)) => Some(Int(!v)),
        (UnaryOp::BitNot, Long(v)) => Some(Long(!v)),
        _ => None,
    }
}

/// Unary numeric promotion; booleans and strings pass through.
fn promote_unary(value: Constant) -> Option<Constant> {
    use Constant::*;
    Some(match value {
        Byte(v) => Int(v as i32),
        Short(v) => Int(v as i32),
        Char(v) => Int(v as i32),
        other => other,
    })
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Int,
    Long,
    Float,
    Double,
}

fn rank(value: &Constant) -> Option<Rank> {
    use Constant::*;
    match value {
        Byte(_) | Short(_) | Char(_) | Int(_) => Some(Rank::Int),
        Long(_) => Some(Rank::Long),
        Float(_) => Some(Rank::Float),
        Double(_) => Some(Rank::Double),
        Bool(_) | String(_) => None,
    }
}

fn binary(op: BinaryOp, l: Constant, r: Constant) -> Option<Constant> {
    use Constant::*;

    if op == BinaryOp::Add && (matches!(l, String(_)) || matches!(r, String(_))) {
        return Some(String(format!("{}{}", java_string(&l), java_string(&r))));
    }
    if let (Bool(a), Bool(b)) = (&l, &r) {
        let (a, b) = (*a, *b);
        return Some(Bool(match op {
            BinaryOp::And | BinaryOp::BitAnd => a && b,
            BinaryOp::Or | BinaryOp::BitOr => a || b,
            BinaryOp::BitXor | BinaryOp::Ne => a != b,
            BinaryOp::Eq => a == b,
            _ => return None,
        }));
    }
    if op.is_shift() {
        let distance = r.as_i64()?;
        return match promote_unary(l)? {
            Int(v) => {
                let d = (distance & 0x1f) as u32;
                Some(Int(match op {
                    BinaryOp::Shl => v.wrapping_shl(d),
                    BinaryOp::Shr => v.wrapping_shr(d),
                    _ => ((v as u32) >> d) as i32,
                }))
            }
            Long(v) => {
                let d = (distance & 0x3f) as u32;
                Some(Long(match op {
                    BinaryOp::Shl => v.wrapping_shl(d),
                    BinaryOp::Shr => v.wrapping_shr(d),
                    _ => ((v as u64) >> d) as i64,
                }))
            }
            _ => None,
        };
    }

    let promoted = rank(&l)?.max(rank(&r)?);
    match promoted {
        Rank::Int => {
            let (a, b) = (l.as_i64()? as i32, r.as_i64()? as i32);
            integral(op, a, b, Int, |x, y| x.checked_div(y), |x, y| x.checked_rem(y))
                .or_else(|| compare(op, a, b))
                .or_else(|| arith_int(op, a, b).map(Int))
        }
        Rank::Long => {
            let (a, b) = (l.as_i64()?, r.as_i64()?);
            integral(op, a, b, Long, |x, y| x.checked_div(y), |x, y| x.checked_rem(y))
                .or_else(|| compare(op, a, b))
                .or_else(|| arith_long(op, a, b).map(Long))
        }
        Rank::Float => {
            let (a, b) = (l.as_f64()? as f32, r.as_f64()? as f32);
            compare(op, a, b).or_else(|| floating(op, a, b).map(Float))
        }
        Rank::Double => {
            let (a, b) = (l.as_f64()?, r.as_f64()?);
            compare(op, a, b).or_else(|| floating(op, a, b).map(Double))
        }
    }
}

/// Division and remainder, which are not constants when dividing by zero.
fn integral<T: Default + PartialEq + Copy>(
    op: BinaryOp,
    a: T,
    b: T,
    wrap: fn(T) -> Constant,
    div: fn(T, T) -> Option<T>,
    rem: fn(T, T) -> Option<T>,
) -> Option<Constant> {
    match op {
        BinaryOp::Div | BinaryOp::Rem if b == T::default() => None,
        // MIN / -1 overflows; Java wraps to MIN and the remainder is 0.
        BinaryOp::Div => div(a, b).or(Some(a)).map(wrap),
        BinaryOp::Rem => rem(a, b).or(Some(T::default())).map(wrap),
        _ => None,
    }
}

fn compare<T: PartialOrd>(op: BinaryOp, a: T, b: T) -> Option<Constant> {
    Some(Constant::Bool(match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Gt => a > b,
        BinaryOp::Le => a <= b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        _ => return None,
    }))
}

fn arith_int(op: BinaryOp, a: i32, b: i32) -> Option<i32> {
    Some(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        _ => return None,
    })
}

fn arith_long(op: BinaryOp, a: i64, b: i64) -> Option<i64> {
    Some(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        _ => return None,
    })
}

fn floating<T>(op: BinaryOp, a: T, b: T) -> Option<T>
where
    T: std::ops::Add<Output = T>
        + std::ops::Sub<Output = T>
        + std::ops::Mul<Output = T>
        + std::ops::Div<Output = T>
        + std::ops::Rem<Output = T>,
{
    Some(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => return None,
    })
}

/// Converts a constant to `target` the way an assignment or cast would.
fn cast(env: &dyn TypeEnv, value: Constant, target: &Type) -> Option<Constant> {
    use Constant::*;
    if target.class_id() == Some(env.well_known().string) {
        return matches!(value, String(_)).then_some(value);
    }
    let Type::Primitive(p) = target else {
        return None;
    };
    if *p == PrimitiveType::Boolean {
        return matches!(value, Bool(_)).then_some(value);
    }
    let float = value.as_f64()?;
    let integral = match value {
        Float(_) | Double(_) => None,
        _ => Some(value.as_i64()?),
    };
    // Floating values narrow to int first, then to the smaller type.
    let int = integral.unwrap_or_else(|| saturate(float) as i64);
    Some(match p {
        PrimitiveType::Byte => Byte(int as i8),
        PrimitiveType::Short => Short(int as i16),
        PrimitiveType::Char => Char(char::from_u32(int as u16 as u32)?),
        PrimitiveType::Int => Int(int as i32),
        PrimitiveType::Long => Long(integral.unwrap_or(float as i64)),
        PrimitiveType::Float => Float(float as f32),
        PrimitiveType::Double => Double(float),
        PrimitiveType::Boolean => return None,
    })
}

/// Java's float-to-int narrowing: NaN is zero and out-of-range values clamp.
fn saturate(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.trunc().clamp(i32::MIN as f64, i32::MAX as f64)
    }
}

/// String conversion as `+` performs it.
fn java_string(value: &Constant) -> String {
    match value {
        Constant::Float(v) => java_float(*v as f64),
        Constant::Double(v) => java_float(*v),
        other => other.to_string(),
    }
}

fn java_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-3..1e7).contains(&magnitude) {
        let formatted = format!("{v:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if mantissa.contains('.') => {
                format!("{mantissa}E{exponent}")
            }
            Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
            None => formatted,
        };
    }
    format!("{v:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompilationContext;
    use vigil_syntax::NodeKind;
    use vigil_test_utils::{compile, JavaFixture};

    fn eval(f: &JavaFixture, kind: NodeKind, text: &str) -> Option<Constant> {
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        const_value(&ctx, f.find(kind, text))
    }

    #[test]
    fn arithmetic_folds_with_java_semantics() {
        let f = compile(
            r#"
            class Test {
                int a = 2 + 3;
                long b = 1L << 40;
                int c = 1 << 33;
                int d = 7 / 2;
                double e = 7 / 2.0;
                int g = 1 / 0;
                int h = -(-2147483647 - 1);
                int i = 'a' + 1;
                int j = -1 >>> 28;
            }
            "#,
        );
        assert_eq!(eval(&f, NodeKind::Binary, "2 + 3"), Some(Constant::Int(5)));
        assert_eq!(eval(&f, NodeKind::Binary, "1L << 40"), Some(Constant::Long(1 << 40)));
        assert_eq!(eval(&f, NodeKind::Binary, "1 << 33"), Some(Constant::Int(2)));
        assert_eq!(eval(&f, NodeKind::Binary, "7 / 2"), Some(Constant::Int(3)));
        assert_eq!(eval(&f, NodeKind::Binary, "7 / 2.0"), Some(Constant::Double(3.5)));
        assert_eq!(eval(&f, NodeKind::Binary, "1 / 0"), None);
        assert_eq!(
            eval(&f, NodeKind::Unary, "-(-2147483647 - 1)"),
            Some(Constant::Int(i32::MIN))
        );
        assert_eq!(eval(&f, NodeKind::Binary, "'a' + 1"), Some(Constant::Int(98)));
        assert_eq!(eval(&f, NodeKind::Binary, "-1 >>> 28"), Some(Constant::Int(15)));
    }

    #[test]
    fn final_variables_are_constants_and_others_are_not() {
        let f = compile(
            r#"
            class Test {
                static final int LIMIT = 10;
                static final String NAME = "vi" + "gil";
                static int counter = 1;
                void m(int p) {
                    final int local = LIMIT * 2;
                    int plain = 3;
                    int x = local + 1;
                    int y = plain + 3;
                    int z = p + 3;
                    String s = NAME + LIMIT;
                    int w = counter + 1;
                    long widened = Integer.MAX_VALUE + 1L;
                }
            }
            "#,
        );
        assert_eq!(eval(&f, NodeKind::Binary, "local + 1"), Some(Constant::Int(21)));
        assert_eq!(eval(&f, NodeKind::Binary, "plain + 3"), None);
        assert_eq!(eval(&f, NodeKind::Binary, "p + 3"), None);
        assert_eq!(
            eval(&f, NodeKind::Binary, "NAME + LIMIT"),
            Some(Constant::String("vigil10".into()))
        );
        assert_eq!(eval(&f, NodeKind::Binary, "counter + 1"), None);
        assert_eq!(
            eval(&f, NodeKind::Binary, "Integer.MAX_VALUE + 1L"),
            Some(Constant::Long(i32::MAX as i64 + 1))
        );
    }

    #[test]
    fn casts_conditionals_and_string_conversion() {
        let f = compile(
            r#"
            class Test {
                int a = (int) 3.9;
                byte b = (byte) 300;
                String c = "x" + 1.0 + true + 'c';
                int d = true ? 1 : 2;
                boolean e = 1 < 2 && 3 > 4;
                String f = "" + 1e10;
            }
            "#,
        );
        assert_eq!(eval(&f, NodeKind::TypeCast, "(int) 3.9"), Some(Constant::Int(3)));
        assert_eq!(eval(&f, NodeKind::TypeCast, "(byte) 300"), Some(Constant::Byte(44)));
        assert_eq!(
            eval(&f, NodeKind::Binary, "\"x\" + 1.0 + true + 'c'"),
            Some(Constant::String("x1.0truec".into()))
        );
        assert_eq!(eval(&f, NodeKind::Conditional, "true ? 1 : 2"), Some(Constant::Int(1)));
        assert_eq!(eval(&f, NodeKind::Binary, "1 < 2 && 3 > 4"), Some(Constant::Bool(false)));
        assert_eq!(
            eval(&f, NodeKind::Binary, "\"\" + 1e10"),
            Some(Constant::String("1.0E10".into()))
        );
    }

    #[test]
    fn boolean_value_short_circuits_unknowns() {
        let f = compile(
            r#"
            class Test {
                void m(boolean flag) {
                    boolean a = false && flag;
                    boolean b = flag || true;
                    boolean c = flag && true;
                    boolean d = !(flag || true);
                }
            }
            "#,
        );
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let value = |text: &str| boolean_value(&ctx, f.find_starting(NodeKind::Variable, text));
        let init = |text: &str| {
            let var = f.find_starting(NodeKind::Variable, text);
            match var.data() {
                NodeData::Variable { init: Some(init), .. } => boolean_value(&ctx, var.at(*init)),
                _ => unreachable!(),
            }
        };
        assert_eq!(value("boolean a"), None);
        assert_eq!(init("boolean a"), Some(false));
        assert_eq!(init("boolean b"), Some(true));
        assert_eq!(init("boolean c"), None);
        assert_eq!(init("boolean d"), Some(false));
        assert_eq!(
            const_value(&ctx, f.find(NodeKind::Binary, "false && flag")),
            None
        );
    }
}
