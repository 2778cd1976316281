pub mod string_literal;
