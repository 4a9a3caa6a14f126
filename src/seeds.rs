//! Seed catalog: built-in question templates per course and tier, plus config-supplied extras.
//!
//! The built-in table is an exhaustive `match` over `(Course, Tier)`, so adding a course
//! variant fails to compile until its seeds (or an explicit empty entry) are written.

use std::collections::HashMap;

use tracing::{error, info};

use crate::config::SeedCfg;
use crate::domain::{Course, QuestionSeed, Tier};

fn seed(stem: &str, options: &[&str], answer: &str, tags: &[&str]) -> QuestionSeed {
  QuestionSeed {
    stem: stem.into(),
    options: options.iter().map(|o| o.to_string()).collect(),
    answer: answer.into(),
    tags: tags.iter().map(|t| t.to_string()).collect(),
  }
}

/// Built-in templates that keep the engine useful without any configuration.
pub fn builtin_seeds(course: Course, tier: Tier) -> Vec<QuestionSeed> {
  match (course, tier) {
    (Course::Python, Tier::Basic) => vec![
      seed("In {course}, which is a valid variable assignment?", &["var x = 5", "x = 5", "let x = 5", "const x: int = 5"], "x = 5", &["variables"]),
      seed("Which built-in returns the length of a sequence in {course}?", &["size()", "count()", "len()", "length()"], "len()", &["builtins", "sequences"]),
      seed("What is the output of print(type(3.14)) in {course}?", &["<class 'int'>", "<class 'float'>", "<class 'str'>", "<class 'bool'>"], "<class 'float'>", &["types"]),
    ],
    (Course::Python, Tier::Intermediate) => vec![
      seed("How do you define a function in {course}?", &["func greet():", "def greet():", "function greet():", "define greet():"], "def greet():", &["functions"]),
      seed("Which data structure in {course} is immutable?", &["list", "dict", "set", "tuple"], "tuple", &["collections"]),
      seed("What does the expression {n1} // {n2} evaluate to in {course}?", &["Floor division", "True", "A float", "Modulo"], "Floor division", &["operators"]),
    ],
    (Course::Python, Tier::Advanced) => vec![
      seed("What does a decorator receive as its argument in {course}?", &["A string", "The decorated function", "A class name", "Nothing"], "The decorated function", &["decorators"]),
      seed("Which keyword turns a function into a generator in {course}?", &["return", "yield", "async", "lambda"], "yield", &["generators"]),
    ],
    (Course::JavaScript, Tier::Basic) => vec![
      seed("How do you declare a variable in {course}?", &["var x;", "variable x;", "declare x;", "def x;"], "var x;", &["variables"]),
      seed("Which method adds an element to an array in {course}?", &["add()", "push()", "append()", "insert()"], "push()", &["arrays"]),
      seed("What is the result of '5' + 3 in {course}?", &["8", "'53'", "TypeError", "NaN"], "'53'", &["coercion"]),
    ],
    (Course::JavaScript, Tier::Intermediate) => vec![
      seed("Which keyword declares a block-scoped variable in {course}?", &["var", "let", "const", "static"], "let", &["scope"]),
      seed("What does Array.prototype.map return?", &["Mutated array", "New array", "Iterator", "Length"], "New array", &["arrays"]),
      seed("What is the output of [1,2,3].filter(x => x > {n2}).length?", &["{n1}", "0", "Depends on array", "Throws error"], "Depends on array", &["arrays"]),
    ],
    (Course::JavaScript, Tier::Advanced) => vec![
      seed("What does await pause in {course}?", &["The whole thread", "The enclosing async function", "The event loop", "Nothing"], "The enclosing async function", &["async"]),
      seed("Which object links an instance to its constructor's methods in {course}?", &["prototype", "this", "super", "window"], "prototype", &["prototypes"]),
    ],
    (Course::React, Tier::Basic) => vec![
      seed("What hook adds state to a functional component in {course}?", &["useState", "useEffect", "useMemo", "useRef"], "useState", &["hooks"]),
      seed("JSX stands for?", &["Java Syntax eXtension", "JavaScript XML", "JSON XML", "JavaScript eXtension"], "JavaScript XML", &["jsx"]),
    ],
    (Course::React, Tier::Intermediate) => vec![
      seed("Which hook runs after render by default?", &["useMemo", "useEffect", "useCallback", "useReducer"], "useEffect", &["hooks"]),
      seed("How do you memoize an expensive computation?", &["useMemo", "useEffect", "useRef", "useLayoutEffect"], "useMemo", &["hooks", "performance"]),
    ],
    (Course::React, Tier::Advanced) => vec![],
    (Course::Vue, Tier::Basic) => vec![
      seed("Which directive renders a list in {course}?", &["v-if", "v-show", "v-for", "v-bind"], "v-for", &["directives"]),
      seed("How do you bind a dynamic attribute in {course}?", &[":src=...", "bind-src=...", "v-attr=src", "src.bind"], ":src=...", &["directives"]),
    ],
    (Course::Vue, Tier::Intermediate) => vec![
      seed("Which API is recommended in Vue 3 for composition?", &["Options API", "Composition API", "Setup-less API", "Legacy API"], "Composition API", &["composition"]),
      seed("What does v-model create by default on an input?", &["one-way binding", "two-way binding", "event listener only", "no binding"], "two-way binding", &["forms"]),
    ],
    (Course::Vue, Tier::Advanced) => vec![],
    (Course::NodeJs, Tier::Basic) => vec![
      seed("Which module handles file operations in {course}?", &["http", "fs", "path", "os"], "fs", &["modules"]),
      seed("Which command initializes a project?", &["npm start", "npm init", "node init", "npx run"], "npm init", &["npm"]),
    ],
    (Course::NodeJs, Tier::Intermediate) => vec![
      seed("Which method creates an HTTP server in {course}?", &["http.createServer", "fs.createServer", "net.createHttp", "server.create"], "http.createServer", &["http"]),
      seed("Which module resolves file paths?", &["fs", "http", "path", "url"], "path", &["modules"]),
    ],
    (Course::NodeJs, Tier::Advanced) => vec![],
    (Course::Java, Tier::Basic) => vec![
      seed("Which keyword defines a class in {course}?", &["class", "def", "struct", "object"], "class", &["classes"]),
      seed("Which type holds true/false?", &["int", "String", "boolean", "char"], "boolean", &["types"]),
      seed("Which keyword creates a new object?", &["make", "new", "create", "init"], "new", &["objects"]),
      seed("Which is a valid access modifier?", &["visible", "public", "opened", "shared"], "public", &["modifiers"]),
      seed("Arrays in {course} are...", &["dynamic sized", "fixed sized", "always null", "hash-based"], "fixed sized", &["arrays"]),
    ],
    (Course::Java, Tier::Intermediate) => vec![
      seed("Which collection preserves insertion order?", &["HashSet", "TreeSet", "LinkedHashSet", "PriorityQueue"], "LinkedHashSet", &["collections"]),
      seed("Which keyword prevents inheritance?", &["static", "final", "abstract", "volatile"], "final", &["inheritance"]),
      seed("Method overloading means...", &["same name, same params", "same name, different params", "different name, same params", "cannot happen"], "same name, different params", &["methods"]),
      seed("String in {course} is...", &["mutable", "immutable", "primitive", "pointer"], "immutable", &["strings"]),
      seed("Which Map keeps insertion order?", &["HashMap", "LinkedHashMap", "TreeMap", "WeakHashMap"], "LinkedHashMap", &["collections"]),
    ],
    (Course::Java, Tier::Advanced) => vec![
      seed("Which interface is implemented to create a thread?", &["Comparable", "Runnable", "AutoCloseable", "Iterable"], "Runnable", &["concurrency"]),
      seed("Which block always executes in try-catch?", &["try", "catch", "finally", "throw"], "finally", &["exceptions"]),
      seed("Which method pair should be consistent?", &["toString/hashCode", "equals/hashCode", "clone/close", "run/start"], "equals/hashCode", &["objects"]),
      seed("What does the 'synchronized' keyword control?", &["I/O speed", "Thread access to a block/object", "JIT compiler", "GC pauses"], "Thread access to a block/object", &["concurrency"]),
      seed("Which stream operation returns a new stream?", &["forEach", "collect", "map", "count"], "map", &["streams"]),
    ],
    (Course::Html, Tier::Basic) => vec![
      seed("Which tag defines a hyperlink in {course}?", &["<div>", "<a>", "<p>", "<span>"], "<a>", &["tags"]),
      seed("Which tag represents the largest heading?", &["<h6>", "<h1>", "<header>", "<title>"], "<h1>", &["tags"]),
    ],
    (Course::Html, Tier::Intermediate) => vec![
      seed("Which input type creates a checkbox?", &["text", "checkbox", "radio", "button"], "checkbox", &["forms"]),
      seed("Which attribute provides alternate text for images?", &["title", "name", "alt", "label"], "alt", &["accessibility"]),
    ],
    (Course::Html, Tier::Advanced) => vec![],
    (Course::Angular, Tier::Basic) => vec![
      seed("Which decorator defines a component in {course}?", &["@NgModule", "@Injectable", "@Component", "@Directive"], "@Component", &["components"]),
      seed("Which CLI command generates a component?", &["ng new c", "ng g c", "ng add c", "ng c"], "ng g c", &["cli"]),
    ],
    (Course::Angular, Tier::Intermediate) => vec![
      seed("Which module is required for routing?", &["FormsModule", "RouterModule", "HttpClientModule", "CommonModule"], "RouterModule", &["routing"]),
      seed("Which lifecycle hook runs once after the first ngOnChanges?", &["ngOnInit", "ngAfterViewInit", "ngDoCheck", "ngOnDestroy"], "ngOnInit", &["lifecycle"]),
    ],
    (Course::Angular, Tier::Advanced) => vec![],
    (Course::TypeScript, Tier::Basic) => vec![
      seed("Which syntax declares a typed variable in {course}?", &["let x: number = 1", "var x := 1", "int x = 1", "x number = 1"], "let x: number = 1", &["types"]),
      seed("Which union type is valid?", &["string||number", "(string|number)", "string|number", "string or number"], "string|number", &["types"]),
    ],
    (Course::TypeScript, Tier::Intermediate) => vec![
      seed("Which feature enables reusable type logic?", &["classes", "generics", "interfaces", "namespaces"], "generics", &["generics"]),
      seed("Which keyword narrows type inside a block?", &["typeof", "instanceof", "narrow", "as"], "instanceof", &["narrowing"]),
    ],
    (Course::TypeScript, Tier::Advanced) => vec![],
  }
}

/// Immutable lookup course -> tier -> ordered seed list. Built once at startup.
#[derive(Clone, Debug)]
pub struct SeedCatalog {
  by_course_tier: HashMap<(Course, Tier), Vec<QuestionSeed>>,
}

impl SeedCatalog {
  pub fn builtin() -> Self {
    let mut by_course_tier = HashMap::new();
    for course in Course::ALL {
      for tier in Tier::ALL {
        by_course_tier.insert((course, tier), builtin_seeds(course, tier));
      }
    }
    Self { by_course_tier }
  }

  /// Built-ins followed by config seeds. Entries that don't resolve are skipped.
  pub fn with_extra(extra: &[SeedCfg]) -> Self {
    let mut catalog = Self::builtin();
    let mut added = 0usize;
    for cfg in extra {
      match cfg.resolve() {
        Some((course, tier, seed)) => {
          catalog.by_course_tier.entry((course, tier)).or_default().push(seed);
          added += 1;
        }
        None => {
          error!(target: "practice_engine", course = %cfg.course, difficulty = cfg.difficulty, "Skipping config seed: unknown course, bad difficulty or empty text.");
        }
      }
    }
    if added > 0 {
      info!(target: "practice_engine", added, "Config seeds merged into catalog");
    }
    catalog
  }

  /// Test/embedding hook: a catalog containing exactly the given table.
  pub fn from_table(table: HashMap<(Course, Tier), Vec<QuestionSeed>>) -> Self {
    Self { by_course_tier: table }
  }

  pub fn seeds(&self, course: Course, tier: Tier) -> &[QuestionSeed] {
    self.by_course_tier
      .get(&(course, tier))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn has_course(&self, course: Course) -> bool {
    Tier::ALL.into_iter().any(|t| !self.seeds(course, t).is_empty())
  }

  pub fn len(&self) -> usize {
    self.by_course_tier.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for SeedCatalog {
  fn default() -> Self {
    Self::builtin()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::normalize_key;

  #[test]
  fn every_course_has_basic_seeds() {
    let catalog = SeedCatalog::builtin();
    for course in Course::ALL {
      assert!(!catalog.seeds(course, Tier::Basic).is_empty(), "{course} has no basic seeds");
      assert!(catalog.has_course(course));
    }
  }

  #[test]
  fn builtin_answers_appear_among_options() {
    for course in Course::ALL {
      for tier in Tier::ALL {
        for s in builtin_seeds(course, tier) {
          let ans = normalize_key(&s.answer);
          assert!(
            s.options.iter().any(|o| normalize_key(o) == ans),
            "{course}/{tier}: answer {:?} missing",
            s.answer
          );
        }
      }
    }
  }

  #[test]
  fn extra_seeds_append_after_builtins() {
    let extra = vec![SeedCfg {
      course: "react".into(),
      difficulty: 3,
      stem: "What does React.memo skip?".into(),
      options: vec!["Re-renders with equal props".into(), "Effects".into()],
      answer: "Re-renders with equal props".into(),
      tags: vec![],
    }];
    let catalog = SeedCatalog::with_extra(&extra);
    assert_eq!(catalog.seeds(Course::React, Tier::Advanced).len(), 1);
    assert_eq!(catalog.len(), SeedCatalog::builtin().len() + 1);
  }
}
