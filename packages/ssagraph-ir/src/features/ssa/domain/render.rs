//! Textual rendering of values
//!
//! Format:
//! - constants as written (`1`, `"abc"`)
//! - `phi(a)[1,2]` with edges in predecessor order
//! - `add(i, 1)` for operators, `f(x, y)` for calls
//! - `Undefined-a`, `Parameter-a`, `FreeValue-a`, `Function-f`
//! - `side-effect(<value>, <target>)`
//!
//! A phi met again while it is being rendered prints its variable name,
//! which keeps loop-carried values finite: `phi(i)[0,add(i, 1)]`.

use super::ids::ValueId;
use super::program::Program;
use super::value::ValueKind;

pub struct ValueRenderer<'p> {
    program: &'p Program,
    stack: Vec<ValueId>,
}

impl<'p> ValueRenderer<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            stack: Vec::new(),
        }
    }

    pub fn render(&mut self, id: ValueId) -> String {
        let id = self.program.resolve(id);
        let value = self.program.value(id);

        match &value.kind {
            ValueKind::Const(lit) => lit.to_string(),
            ValueKind::Parameter { name, .. } => format!("Parameter-{}", name),
            ValueKind::FreeValue { name, .. } => format!("FreeValue-{}", name),
            ValueKind::Undefined { name } => format!("Undefined-{}", name),
            ValueKind::Function { name, .. } => format!("Function-{}", name),
            ValueKind::CaughtError { name } => format!("Error-{}", name),
            ValueKind::Phi { variable, edges } => {
                if self.stack.contains(&id) {
                    return variable.clone();
                }
                self.stack.push(id);
                let edges: Vec<String> = edges.iter().map(|e| self.render(*e)).collect();
                self.stack.pop();
                format!("phi({})[{}]", variable, edges.join(","))
            }
            ValueKind::BinOp { op, lhs, rhs } => {
                let lhs = self.render(*lhs);
                let rhs = self.render(*rhs);
                format!("{}({}, {})", op, lhs, rhs)
            }
            ValueKind::UnOp { op, operand } => format!("{}({})", op, self.render(*operand)),
            ValueKind::Call { callee, args, .. } => {
                let callee = self.render(*callee);
                let args: Vec<String> = args.iter().map(|a| self.render(*a)).collect();
                format!("{}({})", callee, args.join(", "))
            }
            ValueKind::SideEffect { value, target, .. } => {
                format!("side-effect({}, {})", self.render(*value), target)
            }
            ValueKind::MakeObject { class, .. } => {
                format!("make({})", class.as_deref().unwrap_or("object"))
            }
            ValueKind::MakeSlice { elements } => {
                let elements: Vec<String> = elements.iter().map(|e| self.render(*e)).collect();
                format!("make([{}])", elements.join(", "))
            }
            ValueKind::Return { results } => {
                let results: Vec<String> = results.iter().map(|r| self.render(*r)).collect();
                format!("return({})", results.join(", "))
            }
        }
    }
}
