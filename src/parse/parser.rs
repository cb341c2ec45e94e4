use super::content::query::{Query, StatementKind};
use super::scanner::Scanner;
use anyhow::{anyhow, Result as AnyhowResult};
use mockall::automock;
use thiserror::Error;

/**
 * SQL 文を受け取って Query record に変換するためのトレイト。
 * 1 回の parse ごとに独立した instance を使う (cursor を内部に持つため使い回せない)
 */
#[automock]
pub trait Parser {
    /// 文全体の取得
    fn parse(&mut self) -> AnyhowResult<Query>;
}

#[derive(Error, Debug)]
pub enum ParserError {
    // 位置や期待 token の情報は持たせない。最初の失敗で parse 全体を打ち切る
    #[error("syntax error")]
    SyntaxError,
}

/**
 * 文法上の現在位置。peek した token がここからの遷移を決める。
 * ORDER BY や GROUP BY を読み終えた後は sentinel ではなく明示的な Terminal に遷移する
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    // SELECT
    SelectField,
    SelectComma,
    SelectFrom,
    SelectFromTable,
    // INSERT
    InsertTable,
    InsertFieldsOpeningParen,
    InsertField,
    InsertFieldCommaOrClosingParen,
    InsertValuesKeyword,
    InsertValuesOpeningParen,
    InsertValue,
    InsertValueCommaOrClosingParen,
    InsertValuesCommaBeforeOpeningParen,
    // UPDATE
    UpdateTable,
    UpdateSet,
    UpdateField,
    UpdateEquals,
    UpdateValue,
    UpdateComma,
    // DELETE
    DeleteFromTable,
    // WHERE
    Where,
    WhereField,
    WhereOperator,
    WhereValue,
    // GROUP BY
    GroupBy,
    GroupByField,
    GroupByComma,
    // ORDER BY
    OrderBy,
    OrderByField,
    OrderByComma,
    // これ以上 token を期待しない状態。入力が残っていてもここで読むのをやめる
    Terminal,
}

pub struct ParserImpl {
    scanner: Scanner,
    step: Step,
}

impl Parser for ParserImpl {
    fn parse(&mut self) -> AnyhowResult<Query> {
        let mut query = self.detect_statement_kind()?;
        while !self.scanner.at_end() {
            if self.step == Step::Terminal {
                break;
            }
            self.advance(&mut query)?;
        }
        // 必須の keyword や token の手前で入力が尽きた場合はここで落とす
        match self.step {
            Step::Where
            | Step::WhereOperator
            | Step::UpdateComma
            | Step::InsertValuesCommaBeforeOpeningParen
            | Step::Terminal => Ok(query),
            _ => Err(anyhow!(ParserError::SyntaxError)),
        }
    }
}

impl ParserImpl {
    pub fn new(input: String) -> ParserImpl {
        ParserImpl {
            scanner: Scanner::new(input),
            // 文の種類が決まるまでの仮の値。detect_statement_kind が必ず上書きする
            step: Step::Terminal,
        }
    }

    /// 先頭の token から文の種類を判定し、空の record と最初の遷移先を作る
    fn detect_statement_kind(&mut self) -> AnyhowResult<Query> {
        match self.scanner.peek().as_str() {
            "SELECT" => {
                self.scanner.pop();
                self.step = Step::SelectField;
                Ok(Query::new(StatementKind::Select))
            }
            "UPDATE" => {
                self.scanner.pop();
                self.step = Step::UpdateTable;
                Ok(Query::new(StatementKind::Update))
            }
            "INSERT" => {
                self.scanner.pop();
                if self.scanner.peek() != "INTO" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::InsertTable;
                Ok(Query::new(StatementKind::Insert))
            }
            "DELETE" => {
                self.scanner.pop();
                if self.scanner.peek() != "FROM" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::DeleteFromTable;
                Ok(Query::new(StatementKind::Delete))
            }
            _ => Err(anyhow!(ParserError::SyntaxError)),
        }
    }

    /// 現在の step で token を 1 つ処理し、次の step へ遷移する
    fn advance(&mut self, query: &mut Query) -> AnyhowResult<()> {
        match self.step {
            Step::SelectField => {
                query.push_field(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::SelectComma;
            }
            Step::SelectComma => {
                if self.scanner.peek() == "," {
                    self.scanner.pop();
                    self.step = Step::SelectField;
                } else {
                    self.step = Step::SelectFrom;
                }
            }
            Step::SelectFrom => {
                if self.scanner.peek() != "FROM" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::SelectFromTable;
            }
            Step::SelectFromTable => {
                query.set_table_name(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::Where;
            }
            Step::InsertTable => {
                query.set_table_name(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::InsertFieldsOpeningParen;
            }
            Step::InsertFieldsOpeningParen => match self.scanner.peek().as_str() {
                "(" => {
                    self.scanner.pop();
                    self.step = Step::InsertField;
                }
                "VALUES" => {
                    self.step = Step::InsertValuesKeyword;
                }
                _ => return Err(anyhow!(ParserError::SyntaxError)),
            },
            Step::InsertField => {
                query.push_field(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::InsertFieldCommaOrClosingParen;
            }
            Step::InsertFieldCommaOrClosingParen => match self.scanner.peek().as_str() {
                "," => {
                    self.scanner.pop();
                    self.step = Step::InsertField;
                }
                ")" => {
                    self.scanner.pop();
                    self.step = Step::InsertValuesKeyword;
                }
                _ => return Err(anyhow!(ParserError::SyntaxError)),
            },
            Step::InsertValuesKeyword => {
                if self.scanner.peek() != "VALUES" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::InsertValuesOpeningParen;
            }
            Step::InsertValuesOpeningParen => {
                if self.scanner.peek() != "(" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                query.start_insert_row();
                self.scanner.pop();
                self.step = Step::InsertValue;
            }
            Step::InsertValue => {
                query.push_insert_value(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::InsertValueCommaOrClosingParen;
            }
            Step::InsertValueCommaOrClosingParen => match self.scanner.peek().as_str() {
                "," => {
                    self.scanner.pop();
                    self.step = Step::InsertValue;
                }
                ")" => {
                    self.scanner.pop();
                    self.step = Step::InsertValuesCommaBeforeOpeningParen;
                }
                _ => return Err(anyhow!(ParserError::SyntaxError)),
            },
            Step::InsertValuesCommaBeforeOpeningParen => {
                if self.scanner.peek() != "," {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::InsertValuesOpeningParen;
            }
            Step::UpdateTable => {
                let table_name = self.scanner.peek();
                // table 名の位置にいきなり SET が来たら table 名が無い
                if table_name == "SET" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                query.set_table_name(table_name);
                self.scanner.pop();
                self.step = Step::UpdateSet;
            }
            Step::UpdateSet => {
                if self.scanner.peek() != "SET" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::UpdateField;
            }
            Step::UpdateField => {
                query.push_field(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::UpdateEquals;
            }
            Step::UpdateEquals => {
                if self.scanner.peek() != "=" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::UpdateValue;
            }
            Step::UpdateValue => {
                // field と同じ順で積むので、fields と update_values の長さは常に一致する
                query.push_update_value(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::UpdateComma;
            }
            Step::UpdateComma => match self.scanner.peek().as_str() {
                "," => {
                    self.scanner.pop();
                    self.step = Step::UpdateField;
                }
                "WHERE" => {
                    self.step = Step::Where;
                }
                _ => {
                    self.step = Step::Terminal;
                }
            },
            Step::DeleteFromTable => {
                query.set_table_name(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::Where;
            }
            Step::Where => {
                if self.scanner.peek() != "WHERE" {
                    return Err(anyhow!(ParserError::SyntaxError));
                }
                self.scanner.pop();
                self.step = Step::WhereField;
            }
            Step::WhereField => {
                query.push_condition(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::WhereOperator;
            }
            Step::WhereOperator => {
                query.push_condition(self.scanner.peek());
                self.scanner.pop();
                self.step = Step::WhereValue;
            }
            Step::WhereValue => {
                query.push_condition(self.scanner.peek());
                self.scanner.pop();
                match self.scanner.peek().as_str() {
                    "ORDER BY" => self.step = Step::OrderBy,
                    "GROUP BY" => self.step = Step::GroupBy,
                    // AND などの接続詞と後続の field, operator, value は
                    // operator の state を経由して同じ平坦な condition に積まれていく
                    _ => self.step = Step::WhereOperator,
                }
            }
            Step::GroupBy => {
                self.scanner.pop();
                self.step = Step::GroupByField;
            }
            Step::GroupByField => {
                query.push_group_by_field(self.scanner.peek());
                self.scanner.pop();
                match self.scanner.peek().as_str() {
                    "ORDER BY" => self.step = Step::OrderBy,
                    "," => self.step = Step::GroupByComma,
                    _ => self.step = Step::Terminal,
                }
            }
            Step::GroupByComma => {
                self.scanner.pop();
                self.step = Step::GroupByField;
            }
            Step::OrderBy => {
                self.scanner.pop();
                self.step = Step::OrderByField;
            }
            Step::OrderByField => {
                query.push_order_by_field(self.scanner.peek());
                self.scanner.pop();
                match self.scanner.peek().as_str() {
                    "," => self.step = Step::OrderByComma,
                    _ => self.step = Step::Terminal,
                }
            }
            Step::OrderByComma => {
                self.scanner.pop();
                self.step = Step::OrderByField;
            }
            Step::Terminal => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod parser_test {
    use super::*;

    fn parse(statement: &str) -> AnyhowResult<Query> {
        ParserImpl::new(statement.to_string()).parse()
    }

    #[test]
    fn test_select_sentence() {
        let query = parse("SELECT a, b FROM table").unwrap();
        assert_eq!(query.get_kind(), StatementKind::Select);
        assert_eq!(query.get_table_name(), "table");
        assert_eq!(query.get_fields(), &vec!["a".to_string(), "b".to_string()]);
        assert!(query.get_condition().is_empty());
    }

    #[test]
    fn test_select_asterisk_with_lower_case_keywords() {
        let query = parse("select * from table").unwrap();
        assert_eq!(query.get_kind(), StatementKind::Select);
        assert_eq!(query.get_table_name(), "table");
        assert_eq!(query.get_fields(), &vec!["*".to_string()]);
    }

    #[test]
    fn test_select_sentence_with_where_phrase() {
        let query = parse("SELECT * FROM table WHERE a >= 1").unwrap();
        assert_eq!(query.get_fields(), &vec!["*".to_string()]);
        assert_eq!(
            query.get_condition(),
            &vec!["a".to_string(), ">=".to_string(), "1".to_string()]
        );
    }

    #[test]
    fn test_select_sentence_with_group_by_and_order_by() {
        let query = parse("SELECT * FROM table WHERE a >= 1 GROUP BY d, e ORDER BY b, c").unwrap();
        assert_eq!(
            query.get_condition(),
            &vec!["a".to_string(), ">=".to_string(), "1".to_string()]
        );
        assert_eq!(
            query.get_group_by_fields(),
            &vec!["d".to_string(), "e".to_string()]
        );
        assert_eq!(
            query.get_order_by_fields(),
            &vec!["b".to_string(), "c".to_string()]
        );
        assert!(query.get_having_condition().is_empty());
    }

    #[test]
    fn test_select_sentence_with_order_by_only() {
        let query = parse("SELECT * FROM table WHERE a >= 1 ORDER BY b").unwrap();
        assert_eq!(query.get_order_by_fields(), &vec!["b".to_string()]);
        assert!(query.get_group_by_fields().is_empty());
    }

    #[test]
    fn test_select_sentence_with_single_group_by_field() {
        let query = parse("SELECT * FROM table WHERE a >= 1 GROUP BY d").unwrap();
        assert_eq!(query.get_group_by_fields(), &vec!["d".to_string()]);
    }

    #[test]
    fn test_it_returns_error_if_statement_kind_is_unknown() {
        assert!(parse("SEGECT a, b FROM table").is_err());
    }

    #[test]
    fn test_it_returns_error_if_input_is_empty() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_it_returns_error_if_from_is_missing() {
        assert!(parse("SELECT * table").is_err());
    }

    #[test]
    fn test_it_returns_error_if_comma_is_missing_between_fields() {
        assert!(parse("SELECT a b FROM table").is_err());
    }

    #[test]
    fn test_it_returns_error_if_input_ends_before_from() {
        assert!(parse("SELECT a").is_err());
        assert!(parse("SELECT a FROM").is_err());
    }

    #[test]
    fn test_insert_sentence_without_field_list() {
        let query = parse("INSERT INTO table VALUES (1, 2, 3)").unwrap();
        assert_eq!(query.get_kind(), StatementKind::Insert);
        assert_eq!(query.get_table_name(), "table");
        assert!(query.get_fields().is_empty());
        assert_eq!(
            query.get_insert_values(),
            &vec![vec!["1".to_string(), "2".to_string(), "3".to_string()]]
        );
    }

    #[test]
    fn test_insert_sentence_with_multiple_rows() {
        let query = parse("INSERT INTO table (a, b, c) VALUES (1, 2, 3),(4,5,6)").unwrap();
        assert_eq!(
            query.get_fields(),
            &vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(
            query.get_insert_values(),
            &vec![
                vec!["1".to_string(), "2".to_string(), "3".to_string()],
                vec!["4".to_string(), "5".to_string(), "6".to_string()],
            ]
        );
    }

    #[test]
    fn test_it_returns_error_if_into_is_missing() {
        assert!(parse("INSERT table VALUES (1)").is_err());
    }

    #[test]
    fn test_it_returns_error_if_input_ends_before_values() {
        assert!(parse("INSERT INTO table (a, b)").is_err());
        assert!(parse("INSERT INTO table VALUES").is_err());
        assert!(parse("INSERT INTO table VALUES (1, 2").is_err());
    }

    #[test]
    fn test_update_sentence() {
        let query = parse("UPDATE table SET a = 1, b = 2").unwrap();
        assert_eq!(query.get_kind(), StatementKind::Update);
        assert_eq!(query.get_table_name(), "table");
        assert_eq!(query.get_fields(), &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            query.get_update_values(),
            &vec!["1".to_string(), "2".to_string()]
        );
        assert_eq!(query.get_fields().len(), query.get_update_values().len());
    }

    #[test]
    fn test_update_sentence_with_where_phrase() {
        let query = parse("UPDATE table SET a = 1 WHERE b = 2").unwrap();
        assert_eq!(query.get_fields(), &vec!["a".to_string()]);
        assert_eq!(query.get_update_values(), &vec!["1".to_string()]);
        assert_eq!(
            query.get_condition(),
            &vec!["b".to_string(), "=".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn test_it_returns_error_if_update_table_name_is_missing() {
        assert!(parse("UPDATE SET a = 1").is_err());
    }

    #[test]
    fn test_it_returns_error_if_input_ends_before_set_or_value() {
        assert!(parse("UPDATE table").is_err());
        assert!(parse("UPDATE table SET a").is_err());
        assert!(parse("UPDATE table SET a =").is_err());
    }

    #[test]
    fn test_delete_sentence_without_where_phrase() {
        let query = parse("DELETE FROM table").unwrap();
        assert_eq!(query.get_kind(), StatementKind::Delete);
        assert_eq!(query.get_table_name(), "table");
        assert!(query.get_condition().is_empty());
    }

    #[test]
    fn test_delete_sentence_with_compound_condition() {
        let query = parse("DELETE FROM table WHERE a >= 1 AND b + c <= 100").unwrap();
        assert_eq!(
            query.get_condition(),
            &vec![
                "a".to_string(),
                ">=".to_string(),
                "1".to_string(),
                "AND".to_string(),
                "b".to_string(),
                "+".to_string(),
                "c".to_string(),
                "<=".to_string(),
                "100".to_string(),
            ]
        );
    }

    #[test]
    fn test_it_returns_error_if_delete_from_is_missing() {
        assert!(parse("DELETE table").is_err());
    }

    #[test]
    fn test_it_returns_error_if_where_keyword_is_missing() {
        assert!(parse("DELETE FROM table a >= 1").is_err());
    }

    #[test]
    fn test_it_returns_error_if_where_operator_has_no_value() {
        assert!(parse("SELECT * FROM table WHERE a >=").is_err());
        assert!(parse("DELETE FROM table WHERE").is_err());
    }

    #[test]
    fn test_order_by_stops_cleanly_before_trailing_tokens() {
        // ORDER BY の field を読み終えたら、入力が残っていてもそこで読むのをやめる
        let query = parse("SELECT * FROM table WHERE a = 1 ORDER BY b garbage").unwrap();
        assert_eq!(query.get_order_by_fields(), &vec!["b".to_string()]);
        assert_eq!(
            query.get_condition(),
            &vec!["a".to_string(), "=".to_string(), "1".to_string()]
        );
    }

    #[test]
    fn test_update_stops_cleanly_before_trailing_tokens() {
        let query = parse("UPDATE table SET a = 1 garbage").unwrap();
        assert_eq!(query.get_fields(), &vec!["a".to_string()]);
        assert_eq!(query.get_update_values(), &vec!["1".to_string()]);
    }

    #[test]
    fn test_multibyte_identifiers_are_parsed_without_panic() {
        let query = parse("SELECT 名前, b FROM テーブル WHERE a >= 1").unwrap();
        assert_eq!(query.get_table_name(), "テーブル");
        assert_eq!(
            query.get_fields(),
            &vec!["名前".to_string(), "b".to_string()]
        );
        assert_eq!(
            query.get_condition(),
            &vec!["a".to_string(), ">=".to_string(), "1".to_string()]
        );
    }

    #[test]
    fn test_display_rebuilds_select_sentence() {
        let query = parse("SELECT a, b FROM table WHERE a >= 1 ORDER BY b").unwrap();
        assert_eq!(
            query.to_string(),
            "select a, b from table where a >= 1 order by b"
        );
    }

    #[test]
    fn test_display_rebuilds_insert_sentence() {
        let query = parse("INSERT INTO table (a, b) VALUES (1, 2),(3,4)").unwrap();
        assert_eq!(
            query.to_string(),
            "insert into table (a, b) values (1, 2), (3, 4)"
        );
    }

    #[test]
    fn test_display_rebuilds_update_sentence() {
        let query = parse("UPDATE table SET a = 1, b = 2").unwrap();
        assert_eq!(query.to_string(), "update table set a = 1, b = 2");
    }
}
