//! Java runtime support emitted next to the generated sources

use crate::backend::CodegenOptions;
use crate::Result;
use std::fmt::Write;

pub const CLASS_NAME: &str = "Builtins";

/// File name of the runtime class, relative to the output root
pub fn file_name(options: &CodegenOptions) -> String {
    format!("{}.{}", CLASS_NAME, options.target.file_extension)
}

/// Source of the `Builtins` class: printable list and map types plus a
/// null-safe `println`
pub fn generate(options: &CodegenOptions) -> Result<String> {
    let pad = |level: usize| " ".repeat(level * options.indent_width);
    let mut code = String::new();

    writeln!(code, "public class {CLASS_NAME} {{")?;

    writeln!(code, "{}public static class List<T> extends java.util.ArrayList<T> {{", pad(1))?;
    writeln!(code, "{}@Override", pad(2))?;
    writeln!(code, "{}public String toString() {{", pad(2))?;
    writeln!(code, "{}StringBuilder out = new StringBuilder(\"[\");", pad(3))?;
    writeln!(code, "{}for (int i = 0; i < size(); i++) {{", pad(3))?;
    writeln!(code, "{}if (i > 0) {{", pad(4))?;
    writeln!(code, "{}out.append(\", \");", pad(5))?;
    writeln!(code, "{}}}", pad(4))?;
    writeln!(code, "{}out.append(String.valueOf(get(i)));", pad(4))?;
    writeln!(code, "{}}}", pad(3))?;
    writeln!(code, "{}return out.append(\"]\").toString();", pad(3))?;
    writeln!(code, "{}}}", pad(2))?;
    writeln!(code, "{}}}", pad(1))?;
    writeln!(code)?;

    writeln!(code, "{}public static class Map<K, V> extends java.util.HashMap<K, V> {{}}", pad(1))?;
    writeln!(code)?;

    writeln!(code, "{}public static void println(Object value) {{", pad(1))?;
    writeln!(code, "{}if (value == null) {{", pad(2))?;
    writeln!(code, "{}System.out.println(\"null\");", pad(3))?;
    writeln!(code, "{}}} else {{", pad(2))?;
    writeln!(code, "{}System.out.println(value.toString());", pad(3))?;
    writeln!(code, "{}}}", pad(2))?;
    writeln!(code, "{}}}", pad(1))?;

    write!(code, "}}")?;
    Ok(code)
}
