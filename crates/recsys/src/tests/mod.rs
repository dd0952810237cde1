mod ranking_test;
