//! Language name to file extension inference per judge platform

use crate::slug::Platform;

/// Infer the archive file extension from a platform's language label.
/// Unknown languages fall back to `txt` so nothing is ever dropped.
pub fn extension_for(platform: Platform, language: &str) -> &'static str {
    match platform {
        Platform::Codeforces => codeforces_extension(language),
        Platform::Leetcode => leetcode_extension(language),
        _ => generic_extension(language),
    }
}

/// Codeforces submission language strings, e.g. "GNU C++17", "PyPy 3".
fn codeforces_extension(language: &str) -> &'static str {
    if language.contains("Py") {
        "py"
    } else if language.contains("Java") {
        "java"
    } else if language.contains("++") {
        "cpp"
    } else {
        "txt"
    }
}

/// LeetCode language slugs, e.g. "python3", "cpp".
fn leetcode_extension(language: &str) -> &'static str {
    match language {
        "cpp" => "cpp",
        "java" => "java",
        "python" | "python3" => "py",
        "c" => "c",
        "csharp" => "cs",
        "javascript" => "js",
        "ruby" => "rb",
        "swift" => "swift",
        "golang" => "go",
        "scala" => "scala",
        "kotlin" => "kt",
        "rust" => "rs",
        "php" => "php",
        "typescript" => "ts",
        _ => "txt",
    }
}

/// Free-form language names (HackerRank and any other judge).
fn generic_extension(language: &str) -> &'static str {
    let lower = language.to_lowercase();
    if lower.contains("python") {
        "py"
    } else if lower.contains("c++") || lower.contains("cpp") {
        "cpp"
    } else if lower.contains("c#") {
        "cs"
    } else if lower.contains("javascript") {
        "js"
    } else if lower.contains("typescript") {
        "ts"
    } else if lower.contains("java") {
        "java"
    } else if lower.contains("ruby") {
        "rb"
    } else if lower.contains("swift") {
        "swift"
    } else if lower.contains("go") {
        "go"
    } else if lower.contains("scala") {
        "scala"
    } else if lower.contains("kotlin") {
        "kt"
    } else if lower.contains("rust") {
        "rs"
    } else if lower.contains("php") {
        "php"
    } else {
        "txt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codeforces_language_strings() {
        assert_eq!(extension_for(Platform::Codeforces, "GNU C++17"), "cpp");
        assert_eq!(extension_for(Platform::Codeforces, "PyPy 3-64"), "py");
        assert_eq!(extension_for(Platform::Codeforces, "Java 21"), "java");
        assert_eq!(extension_for(Platform::Codeforces, "Befunge"), "txt");
    }

    #[test]
    fn leetcode_language_slugs() {
        assert_eq!(extension_for(Platform::Leetcode, "python3"), "py");
        assert_eq!(extension_for(Platform::Leetcode, "golang"), "go");
        assert_eq!(extension_for(Platform::Leetcode, "rust"), "rs");
        assert_eq!(extension_for(Platform::Leetcode, "elixir"), "txt");
    }

    #[test]
    fn generic_names_are_case_insensitive() {
        assert_eq!(extension_for(Platform::Hackerrank, "Python 3"), "py");
        assert_eq!(extension_for(Platform::Hackerrank, "C++14"), "cpp");
        assert_eq!(extension_for(Platform::Other, "TypeScript"), "ts");
        assert_eq!(extension_for(Platform::Other, "Whitespace"), "txt");
    }

    // "java" must not shadow "javascript" in the free-form matcher.
    #[test]
    fn javascript_before_java() {
        assert_eq!(extension_for(Platform::Hackerrank, "JavaScript (Node.js)"), "js");
    }
}
