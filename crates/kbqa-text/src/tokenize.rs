use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Splits text into lowercase alphanumeric runs and drops one-character tokens.
#[derive(Clone)]
pub struct Tokenizer {
	analyzer: TextAnalyzer,
	min_chars: usize,
}

impl Default for Tokenizer {
	fn default() -> Self { Self::new() }
}

impl Tokenizer {
	pub fn new() -> Self {
		let analyzer = TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build();
		Self { analyzer, min_chars: 2 }
	}

	pub fn tokens(&self, text: &str) -> Vec<String> {
		// token_stream needs &mut; the analyzer is a cheap boxed clone
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(text);
		let mut out = Vec::new();
		while stream.advance() {
			let token = &stream.token().text;
			if token.chars().count() >= self.min_chars { out.push(token.clone()); }
		}
		out
	}
}

/// Word n-grams for every `n` in `min..=max`, shorter grams first, each in text order.
pub fn ngrams(tokens: &[String], min: usize, max: usize) -> Vec<String> {
	let mut out = Vec::new();
	for n in min.max(1)..=max {
		if n > tokens.len() { break; }
		for window in tokens.windows(n) { out.push(window.join(" ")); }
	}
	out
}
