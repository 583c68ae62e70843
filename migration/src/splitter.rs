//! SQL 语句切分
//!
//! 用 `sqlparser` 的分词器按目标数据库方言识别 `;`，字符串、标识符、注释和
//! PostgreSQL 美元引号块中的分号不会被当作分隔符。注释规则随方言变化：
//! - PostgreSQL: `/* */` 可嵌套，支持 `$$ ... $$`、`$tag$ ... $tag$`
//! - MySQL: 额外支持 `#` 行注释，字符串中反斜杠是转义字符
//! - SQLite: `/* */` 在第一个 `*/` 处结束
//!
//! 切出来的语句是原文切片，不经过重新序列化。
//! 不支持 MySQL 客户端的 `DELIMITER` 指令。

use sea_orm::DatabaseBackend;
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::tokenizer::{Location, Token, Tokenizer, TokenizerError};

/// 按方言切分 SQL 文本，丢弃空白或只有注释的片段
pub fn split_statements(
    sql: &str,
    backend: DatabaseBackend,
) -> Result<Vec<String>, TokenizerError> {
    let dialect: Box<dyn Dialect> = match backend {
        DatabaseBackend::Postgres => Box::new(PostgreSqlDialect {}),
        DatabaseBackend::MySql => Box::new(MySqlDialect {}),
        DatabaseBackend::Sqlite => Box::new(SQLiteDialect {}),
    };

    let tokens = Tokenizer::new(dialect.as_ref(), sql).tokenize_with_location()?;
    let offsets = LineOffsets::new(sql);

    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;

    for token in &tokens {
        match &token.token {
            Token::SemiColon => {
                let end = offsets.byte_offset(sql, token.span.start);
                push_fragment(&mut statements, &sql[start..end], has_content);
                start = end + 1;
                has_content = false;
            }
            Token::Whitespace(_) | Token::EOF => {}
            _ => has_content = true,
        }
    }

    push_fragment(&mut statements, &sql[start..], has_content);
    Ok(statements)
}

fn push_fragment(statements: &mut Vec<String>, fragment: &str, has_content: bool) {
    if has_content {
        statements.push(fragment.trim().to_string());
    }
}

/// 分词器位置（1 起始的行、列，列按字符计）到字节偏移的换算
struct LineOffsets {
    starts: Vec<usize>,
}

impl LineOffsets {
    fn new(sql: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn byte_offset(&self, sql: &str, location: Location) -> usize {
        let line = (location.line.max(1) - 1) as usize;
        let line_start = self.starts.get(line).copied().unwrap_or(sql.len());
        let column = (location.column.max(1) - 1) as usize;

        sql[line_start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| line_start + i)
            .unwrap_or(sql.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite(sql: &str) -> Vec<String> {
        split_statements(sql, DatabaseBackend::Sqlite).unwrap()
    }

    fn postgres(sql: &str) -> Vec<String> {
        split_statements(sql, DatabaseBackend::Postgres).unwrap()
    }

    fn mysql(sql: &str) -> Vec<String> {
        split_statements(sql, DatabaseBackend::MySql).unwrap()
    }

    #[test]
    fn test_split_simple_statements() {
        let sql = "CREATE TABLE a (id INTEGER);\nCREATE TABLE b (id INTEGER);\n";
        assert_eq!(
            sqlite(sql),
            vec!["CREATE TABLE a (id INTEGER)", "CREATE TABLE b (id INTEGER)"]
        );
    }

    #[test]
    fn test_split_discards_empty_fragments() {
        let sql = ";;  \n ; SELECT 1;\n\n";
        assert_eq!(sqlite(sql), vec!["SELECT 1"]);
        assert!(sqlite("   \n\t").is_empty());
    }

    #[test]
    fn test_split_keeps_trailing_statement_without_delimiter() {
        assert_eq!(sqlite("SELECT 1; SELECT 2"), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_split_keeps_original_text() {
        let sql = "INSERT INTO notes (body) VALUES ('a;b'); INSERT INTO notes (body) VALUES ('it''s; fine');";
        assert_eq!(
            sqlite(sql),
            vec![
                "INSERT INTO notes (body) VALUES ('a;b')",
                "INSERT INTO notes (body) VALUES ('it''s; fine')",
            ]
        );
    }

    #[test]
    fn test_split_handles_multibyte_text() {
        let sql = "INSERT INTO notes (body) VALUES ('标题；说明');\nSELECT 'é';";
        assert_eq!(
            sqlite(sql),
            vec!["INSERT INTO notes (body) VALUES ('标题；说明')", "SELECT 'é'"]
        );
    }

    #[test]
    fn test_split_ignores_delimiter_inside_identifiers() {
        let sql = "CREATE TABLE \"odd;name\" (id INTEGER); CREATE TABLE `other;name` (id INTEGER);";
        assert_eq!(sqlite(sql).len(), 2);
        assert_eq!(mysql(sql).len(), 2);
    }

    #[test]
    fn test_split_ignores_delimiter_inside_comments() {
        let sql = "-- first; still a comment\nCREATE TABLE a (id INTEGER);\n/* block; comment */\nCREATE TABLE b (id INTEGER);";
        let statements = sqlite(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("CREATE TABLE a (id INTEGER)"));
        assert!(statements[1].ends_with("CREATE TABLE b (id INTEGER)"));
    }

    #[test]
    fn test_block_comment_ends_at_first_close_on_sqlite() {
        let sql = "/* see /* old */\nCREATE TABLE a (id INTEGER);\nCREATE TABLE b (id INTEGER);";
        let statements = sqlite(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("CREATE TABLE a (id INTEGER)"));
        assert_eq!(statements[1], "CREATE TABLE b (id INTEGER)");

        assert_eq!(mysql(sql).len(), 2);
    }

    #[test]
    fn test_block_comments_nest_on_postgres() {
        let sql = "/* outer; /* inner; */ still comment; */\nCREATE TABLE a (id INTEGER);";
        let statements = postgres(sql);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].ends_with("CREATE TABLE a (id INTEGER)"));
    }

    #[test]
    fn test_mysql_hash_comment() {
        let sql = "# don't split here;\nCREATE TABLE a (id INT);\nCREATE TABLE b (id INT);";
        let statements = mysql(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("CREATE TABLE a (id INT)"));
    }

    #[test]
    fn test_split_drops_comment_only_fragments() {
        let sql = "CREATE TABLE a (id INTEGER);\n-- trailing note\n";
        assert_eq!(sqlite(sql), vec!["CREATE TABLE a (id INTEGER)"]);
        assert!(sqlite("-- nothing to do\n/* really */").is_empty());
    }

    #[test]
    fn test_split_dollar_quoted_function_body() {
        let sql = r#"
CREATE FUNCTION touch() RETURNS trigger AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;
CREATE TABLE t (id INTEGER);
"#;
        let statements = postgres(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("RETURN NEW;"));
        assert!(statements[0].ends_with("LANGUAGE plpgsql"));
    }

    #[test]
    fn test_split_named_dollar_tag() {
        let sql = "DO $body$ BEGIN PERFORM 1; END $body$; SELECT $1;";
        assert_eq!(
            postgres(sql),
            vec!["DO $body$ BEGIN PERFORM 1; END $body$", "SELECT $1"]
        );
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        assert!(split_statements("SELECT 'oops;", DatabaseBackend::Sqlite).is_err());
    }
}
